//! Document node tree for Vellum renderers.
//!
//! A small, thread-local DOM: elements and text nodes with parent back-links,
//! cheap handle cloning, and HTML-like markup serialization. Renderers use it
//! three ways:
//!
//! - **Scratch regions**: [`Node::clone_shell`] produces an empty, detached
//!   copy of a container that scripts write into. Partial or throwing output
//!   never touches the live tree.
//! - **Commit by transfer**: [`Node::take_children`] moves staged children
//!   out of a scratch region and into the live container without copying.
//! - **Diffing**: [`Node::inner_markup`] serializes a subtree so an unchanged
//!   render can be detected and skipped, leaving the live nodes untouched.
//!
//! Handles are `Rc`-backed and `Clone` is shallow; [`Node::ptr_eq`] tells two
//! handles to the same node apart from two equal-looking nodes.

mod node;

pub use node::Node;
