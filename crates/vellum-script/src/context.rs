//! The API context handed to running scripts.
//!
//! Each render constructs a fresh [`ScriptContext`] bound to the node the
//! script may write into (a block's scratch region, or an inline render's
//! fresh span) and the origin path of the document section being rendered.
//! [`ScriptContext::install`] turns it into a plain Lua table of functions,
//! so scripts call the surface with dot syntax:
//!
//! ```lua
//! dv.el("p", "hello")
//! dv.header(2, "Tasks"):el("small", "(generated)")
//!
//! local page = dv.page("../projects/vellum.md")
//! return page and page.title
//! ```
//!
//! The same table is reachable under both conventional names, `dv` and
//! `vellum`. Contexts are never shared across renders.

use crate::index::QueryIndex;
use crate::settings::ScriptSettings;
use mlua::{Lua, LuaSerdeExt, MetaMethod, Result as LuaResult, Table, UserData, UserDataMethods, Value};
use std::sync::Arc;
use std::time::Duration;
use vellum_dom::Node;

/// Chainable node handle returned by the context's element builders.
#[derive(Clone)]
pub struct LuaNode(Node);

impl LuaNode {
    pub(crate) fn node(&self) -> &Node {
        &self.0
    }
}

impl UserData for LuaNode {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        // node:el(tag, text?) -> node — append a child element
        methods.add_method("el", |_, this, (tag, text): (String, Option<String>)| {
            let child = Node::element(tag);
            if let Some(text) = text {
                child.append_text(text);
            }
            this.0.append_child(&child);
            Ok(LuaNode(child))
        });

        // node:text(content) -> node — append a text child
        methods.add_method("text", |_, this, content: String| {
            this.0.append_text(content);
            Ok(this.clone())
        });

        // node:attr(name, value) -> node
        methods.add_method("attr", |_, this, (name, value): (String, String)| {
            this.0.set_attr(name, value);
            Ok(this.clone())
        });

        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.0.outer_markup()));
    }
}

/// Capability object exposing document and query primitives to a script.
pub struct ScriptContext {
    node: Node,
    origin: String,
    index: Arc<QueryIndex>,
    settings: Arc<ScriptSettings>,
}

impl ScriptContext {
    pub fn new(
        index: Arc<QueryIndex>,
        settings: Arc<ScriptSettings>,
        node: Node,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            node,
            origin: origin.into(),
            index,
            settings,
        }
    }

    /// Origin identifier the context resolves relative links against.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The node this context writes into.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Build the Lua-facing table for this context.
    ///
    /// Consumes the context: its pieces move into the function closures, so
    /// the table is the context for the rest of the render.
    pub fn install(self, lua: &Lua) -> LuaResult<Table> {
        let api = lua.create_table()?;
        let Self {
            node,
            origin,
            index,
            settings,
        } = self;

        // dv.el(tag, text?) -> node — append an element to the bound node
        let bound = node.clone();
        api.set(
            "el",
            lua.create_function(move |_, (tag, text): (String, Option<String>)| {
                let child = Node::element(tag);
                if let Some(text) = text {
                    child.append_text(text);
                }
                bound.append_child(&child);
                Ok(LuaNode(child))
            })?,
        )?;

        // dv.text(content) — append bare text to the bound node
        let bound = node.clone();
        api.set(
            "text",
            lua.create_function(move |_, content: String| {
                bound.append_text(content);
                Ok(())
            })?,
        )?;

        // dv.paragraph(text) -> node
        let bound = node.clone();
        api.set(
            "paragraph",
            lua.create_function(move |_, text: String| {
                let p = Node::element("p");
                p.append_text(text);
                bound.append_child(&p);
                Ok(LuaNode(p))
            })?,
        )?;

        // dv.span(text) -> node
        let bound = node.clone();
        api.set(
            "span",
            lua.create_function(move |_, text: String| {
                let span = Node::element("span");
                span.append_text(text);
                bound.append_child(&span);
                Ok(LuaNode(span))
            })?,
        )?;

        // dv.header(level, text) -> node — level clamped to 1..=6
        let bound = node.clone();
        api.set(
            "header",
            lua.create_function(move |_, (level, text): (u32, String)| {
                let level = level.clamp(1, 6);
                let h = Node::element(format!("h{level}"));
                h.append_text(text);
                bound.append_child(&h);
                Ok(LuaNode(h))
            })?,
        )?;

        // dv.list(items) -> node — bullet list from a sequence of strings
        let bound = node.clone();
        api.set(
            "list",
            lua.create_function(move |_, items: Vec<String>| {
                let ul = Node::element("ul");
                for item in items {
                    let li = Node::element("li");
                    li.append_text(item);
                    ul.append_child(&li);
                }
                bound.append_child(&ul);
                Ok(LuaNode(ul))
            })?,
        )?;

        // dv.origin() -> string
        let origin_value = origin.clone();
        api.set(
            "origin",
            lua.create_function(move |_, ()| Ok(origin_value.clone()))?,
        )?;

        // dv.resolve(path) -> string — origin-relative link resolution
        let origin_value = origin.clone();
        api.set(
            "resolve",
            lua.create_function(move |_, path: String| Ok(resolve_link(&origin_value, &path)))?,
        )?;

        // dv.page(path) -> table? — metadata for a page, resolved
        // against the origin
        let origin_value = origin.clone();
        let index_handle = index.clone();
        api.set(
            "page",
            lua.create_function(move |lua, path: String| {
                let resolved = resolve_link(&origin_value, &path);
                match index_handle.page(&resolved) {
                    Some(metadata) => lua.to_value(&metadata),
                    None => Ok(Value::Nil),
                }
            })?,
        )?;

        // dv.pages() -> {string} — all indexed page paths
        let index_handle = index.clone();
        api.set(
            "pages",
            lua.create_function(move |_, ()| Ok(index_handle.pages()))?,
        )?;

        // dv.null_placeholder() -> string — settings-driven nil rendering
        let settings_handle = settings.clone();
        api.set(
            "null_placeholder",
            lua.create_function(move |_, ()| Ok(settings_handle.render_null_as.clone()))?,
        )?;

        // dv.wait(seconds) — async sleep, yields the coroutine
        api.set(
            "wait",
            lua.create_async_function(|_, secs: f64| async move {
                if !secs.is_finite() || secs < 0.0 {
                    return Err(mlua::Error::runtime(
                        "wait duration must be a finite non-negative number",
                    ));
                }
                tokio::time::sleep(Duration::from_secs_f64(secs)).await;
                Ok(())
            })?,
        )?;

        Ok(api)
    }
}

/// Resolve `target` against the directory of `origin`.
///
/// A leading `/` makes the target absolute within the document root; `.` and
/// `..` segments are collapsed, with `..` saturating at the root.
pub(crate) fn resolve_link(origin: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = origin.split('/').collect();
    parts.pop();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}
