//! Block and inline script renderers.
//!
//! Both shapes evaluate author-supplied script text through the [`Sandbox`]
//! against a fresh [`ScriptContext`] and splice the result into the live
//! tree. The block shape owns a container and commits the script's
//! side-effecting output through a scratch region with a pre-commit diff;
//! the inline shape owns a single placeholder node and replaces it outright
//! with the script's completion value on every render.
//!
//! Failures never escape `render`. A block failure replaces the container's
//! content with a diagnostic; an inline failure appends a sibling diagnostic
//! and leaves the last good target in place.

use crate::context::ScriptContext;
use crate::executor::Sandbox;
use crate::render::{render_error_pre, render_value};
use crate::view::{Refreshable, ViewState};
use async_trait::async_trait;
use mlua::Value;
use std::rc::Rc;
use tracing::{debug, warn};
use vellum_dom::Node;

/// Fixed notice a block shows when script execution is off.
pub const BLOCK_DISABLED_NOTICE: &str =
    "Script blocks are disabled. You can enable them in the Vellum settings.";

/// Fixed notice swapped in for an inline result when inline execution is off.
pub const INLINE_DISABLED_NOTICE: &str = "(disabled; enable in settings)";

/// Renders a script's side-effecting output into a container region.
pub struct BlockRenderer {
    sandbox: Rc<Sandbox>,
    script: String,
    state: ViewState,
    origin: String,
}

impl BlockRenderer {
    pub fn new(
        sandbox: Rc<Sandbox>,
        script: impl Into<String>,
        state: ViewState,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            sandbox,
            script: script.into(),
            state,
            origin: origin.into(),
        }
    }
}

#[async_trait(?Send)]
impl Refreshable for BlockRenderer {
    async fn render(&mut self) {
        let settings = &self.state.settings;
        let container = &self.state.container;

        if !settings.enable_scripts {
            container.clear();
            render_error_pre(container, BLOCK_DISABLED_NOTICE);
            return;
        }

        // Stage output in a detached shell of the container so partial or
        // throwing scripts never touch the live tree.
        let scratch = container.clone_shell();
        let ctx = ScriptContext::new(
            self.state.index.clone(),
            settings.clone(),
            scratch.clone(),
            &self.origin,
        );

        match self.sandbox.eval(&self.script, ctx).await {
            Ok(_) => {
                if !settings.check_markup_before_rerender
                    || scratch.inner_markup() != container.inner_markup()
                {
                    container.clear();
                    for child in scratch.take_children() {
                        container.append_child(&child);
                    }
                } else {
                    debug!(origin = %self.origin, "block output unchanged, skipping commit");
                }
            }
            Err(e) => {
                warn!(origin = %self.origin, error = %e, "script block failed");
                container.clear();
                render_error_pre(container, &format!("Evaluation Error: {e}"));
            }
        }
    }
}

/// Renders a script's single completion value in place of an inline
/// placeholder node.
pub struct InlineRenderer {
    sandbox: Rc<Sandbox>,
    script: String,
    state: ViewState,
    target: Node,
    origin: String,
    // The box the previous failure was rendered into, if any.
    errorbox: Option<Node>,
}

impl InlineRenderer {
    pub fn new(
        sandbox: Rc<Sandbox>,
        script: impl Into<String>,
        state: ViewState,
        target: Node,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            sandbox,
            script: script.into(),
            state,
            target,
            origin: origin.into(),
            errorbox: None,
        }
    }

    /// The currently-live node this renderer owns. Re-pointed to the
    /// replacement on every successful render.
    pub fn target(&self) -> &Node {
        &self.target
    }
}

#[async_trait(?Send)]
impl Refreshable for InlineRenderer {
    async fn render(&mut self) {
        if let Some(errorbox) = self.errorbox.take() {
            errorbox.remove();
        }

        let settings = &self.state.settings;
        if !settings.enable_scripts || !settings.enable_inline_scripts {
            let notice = Node::element("span").with_class("script-disabled");
            notice.append_text(INLINE_DISABLED_NOTICE);
            self.target.replace_with(&notice);
            self.target = notice;
            return;
        }

        let fresh = Node::element("span").with_class("script-inline");
        let ctx = ScriptContext::new(
            self.state.index.clone(),
            settings.clone(),
            fresh.clone(),
            &self.origin,
        );

        let outcome = match self.sandbox.eval(&self.script, ctx).await {
            Ok(value) => {
                self.target.replace_with(&fresh);
                self.target = fresh.clone();
                match value {
                    // Nil means the script spoke through side effects (or
                    // not at all); the fresh node stands as-is.
                    Value::Nil => Ok(()),
                    value => render_value(&value, &fresh, &self.origin, settings.as_ref(), true),
                }
            }
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            warn!(origin = %self.origin, error = %e, "inline script failed");
            let errorbox = Node::element("div").with_class("script-error-box");
            self.state.container.append_child(&errorbox);
            render_error_pre(
                &errorbox,
                &format!("Vellum (for inline script '{}'): {}", self.script, e),
            );
            self.errorbox = Some(errorbox);
        }
    }
}
