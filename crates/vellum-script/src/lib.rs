//! Sandboxed Lua script rendering for Vellum documents
//!
//! This crate is the dynamic script rendering engine: it evaluates
//! author-supplied Lua fragments against a capability-scoped API context and
//! splices their output into the document's node tree, re-rendering as the
//! underlying data changes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  refresh scheduler (host)                   │
//! │  calls render() when a section is dirty     │
//! └─────────────────────────────────────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────────────────────────┐
//! │  BlockRenderer / InlineRenderer             │
//! │  settings gates → fresh ScriptContext       │
//! └─────────────────────────────────────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────────────────────────┐
//! │  Sandbox (mlua, async)                      │
//! │  chunk env binds context as `dv`/`vellum`   │
//! └─────────────────────────────────────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────────────────────────┐
//! │  vellum-dom                                 │
//! │  scratch region → diff → commit by transfer │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use std::sync::Arc;
//! use vellum_dom::Node;
//! use vellum_script::{
//!     BlockRenderer, QueryIndex, Refreshable, Sandbox, ScriptSettings, ViewState,
//! };
//!
//! let sandbox = Rc::new(Sandbox::new()?);
//! let state = ViewState::new(
//!     Node::element("div"),
//!     Arc::new(QueryIndex::new()),
//!     Arc::new(ScriptSettings::enabled()),
//! );
//! let mut view = BlockRenderer::new(sandbox, r#"dv.el("p", "hi")"#, state, "notes/a.md");
//! view.render().await;
//! ```
//!
//! Failures never escape `render`: every script error becomes an in-tree
//! diagnostic node, destructively for blocks and additively for inline
//! results.

mod context;
mod error;
mod executor;
mod index;
mod render;
mod script_view;
mod settings;
mod view;

pub use context::{LuaNode, ScriptContext};
pub use error::{ScriptError, ScriptResult};
pub use executor::Sandbox;
pub use index::QueryIndex;
pub use render::{render_error_pre, render_value, ERROR_CLASS};
pub use script_view::{
    BlockRenderer, InlineRenderer, BLOCK_DISABLED_NOTICE, INLINE_DISABLED_NOTICE,
};
pub use settings::ScriptSettings;
pub use view::{Refreshable, ViewState};
