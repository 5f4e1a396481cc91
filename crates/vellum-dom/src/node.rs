//! The node type and tree operations.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Clone)]
enum NodeKind {
    Element {
        tag: String,
        classes: Vec<String>,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

struct NodeInner {
    kind: NodeKind,
    children: Vec<Node>,
    parent: Weak<RefCell<NodeInner>>,
}

/// A handle to a node in the document tree.
///
/// Cloning a `Node` clones the handle, not the node; both handles refer to
/// the same tree position. Dropping the last handle to a detached subtree
/// frees it.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeInner>>);

impl Node {
    /// Create a detached element node.
    pub fn element(tag: impl Into<String>) -> Self {
        Node(Rc::new(RefCell::new(NodeInner {
            kind: NodeKind::Element {
                tag: tag.into(),
                classes: Vec::new(),
                attrs: Vec::new(),
            },
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    /// Create a detached text node.
    pub fn text(content: impl Into<String>) -> Self {
        Node(Rc::new(RefCell::new(NodeInner {
            kind: NodeKind::Text(content.into()),
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    /// Builder: add a class to an element node. No effect on text nodes.
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    /// Add a class to an element node. No effect on text nodes.
    pub fn add_class(&self, class: impl Into<String>) {
        if let NodeKind::Element { classes, .. } = &mut self.0.borrow_mut().kind {
            classes.push(class.into());
        }
    }

    /// Set an attribute on an element node, replacing any prior value.
    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<String>) {
        if let NodeKind::Element { attrs, .. } = &mut self.0.borrow_mut().kind {
            let name = name.into();
            let value = value.into();
            if let Some(slot) = attrs.iter_mut().find(|(n, _)| *n == name) {
                slot.1 = value;
            } else {
                attrs.push((name, value));
            }
        }
    }

    /// Element tag, or `None` for text nodes.
    pub fn tag(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Text(_))
    }

    /// Whether two handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Parent node, if attached.
    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    pub fn is_attached(&self) -> bool {
        self.parent().is_some()
    }

    /// Handles to the current children, in order.
    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.borrow().children.first().cloned()
    }

    /// Append a child, detaching it from any previous parent first.
    pub fn append_child(&self, child: &Node) {
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }

    /// Append a new text node.
    pub fn append_text(&self, content: impl Into<String>) {
        self.append_child(&Node::text(content));
    }

    /// Replace all children with a single text node.
    pub fn set_text(&self, content: impl Into<String>) {
        self.clear();
        self.append_text(content);
    }

    /// Drop all children, detaching each.
    pub fn clear(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            child.0.borrow_mut().parent = Weak::new();
        }
    }

    /// Transfer all children out, leaving this node empty. The returned
    /// nodes are detached; appending them elsewhere moves, not copies.
    pub fn take_children(&self) -> Vec<Node> {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in &children {
            child.0.borrow_mut().parent = Weak::new();
        }
        children
    }

    /// Detach this node from its parent, if any.
    pub fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent
            .0
            .borrow_mut()
            .children
            .retain(|c| !Rc::ptr_eq(&c.0, &self.0));
        self.0.borrow_mut().parent = Weak::new();
    }

    /// Swap `replacement` into this node's position in its parent.
    ///
    /// Returns `false` (and does nothing) if this node is detached.
    pub fn replace_with(&self, replacement: &Node) -> bool {
        let Some(parent) = self.parent() else {
            return false;
        };
        replacement.remove();
        {
            let mut inner = parent.0.borrow_mut();
            let Some(idx) = inner
                .children
                .iter()
                .position(|c| Rc::ptr_eq(&c.0, &self.0))
            else {
                return false;
            };
            inner.children[idx] = replacement.clone();
        }
        replacement.0.borrow_mut().parent = Rc::downgrade(&parent.0);
        self.0.borrow_mut().parent = Weak::new();
        true
    }

    /// Structure-only copy: same tag/classes/attrs (or text), no children,
    /// detached. This is the scratch-region constructor.
    pub fn clone_shell(&self) -> Node {
        Node(Rc::new(RefCell::new(NodeInner {
            kind: self.0.borrow().kind.clone(),
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    /// Concatenated text of this subtree, without markup.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        let inner = self.0.borrow();
        if let NodeKind::Text(t) = &inner.kind {
            out.push_str(t);
        }
        for child in &inner.children {
            child.collect_text(out);
        }
    }

    /// Serialized markup of this node's children.
    pub fn inner_markup(&self) -> String {
        let mut out = String::new();
        for child in &self.0.borrow().children {
            child.write_markup(&mut out);
        }
        out
    }

    /// Serialized markup of this node including its own tag.
    pub fn outer_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        let inner = self.0.borrow();
        match &inner.kind {
            NodeKind::Text(t) => out.push_str(&escape_text(t)),
            NodeKind::Element { tag, classes, attrs } => {
                out.push('<');
                out.push_str(tag);
                if !classes.is_empty() {
                    out.push_str(" class=\"");
                    out.push_str(&escape_attr(&classes.join(" ")));
                    out.push('"');
                }
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                for child in &inner.children {
                    child.write_markup(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.outer_markup())
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
