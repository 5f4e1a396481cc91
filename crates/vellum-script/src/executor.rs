//! The execution sandbox.
//!
//! Runs author-supplied script text against a per-render [`ScriptContext`].
//! Each evaluation loads the text as its own Lua chunk with a fresh
//! environment table: the context is installed under the two conventional
//! names `dv` and `vellum`, and everything else falls through to the Lua
//! globals. Assignments a script makes to bare names stay in its
//! environment; they never leak into later evaluations.
//!
//! Evaluation is async end to end — a script may suspend on context
//! primitives like `dv.wait`, and `eval` suspends its caller until the
//! script completes or fails.

use crate::context::ScriptContext;
use crate::error::ScriptResult;
use mlua::{Lua, Value};
use std::cell::Cell;
use tracing::debug;

/// Sandboxed evaluator shared by every renderer in a document view.
pub struct Sandbox {
    lua: Lua,
    invocations: Cell<u64>,
}

impl Sandbox {
    pub fn new() -> ScriptResult<Self> {
        Ok(Self {
            lua: Lua::new(),
            invocations: Cell::new(0),
        })
    }

    /// Number of times `eval` has been entered.
    ///
    /// Lets hosts and tests verify that settings gates short-circuit before
    /// any script runs.
    pub fn invocation_count(&self) -> u64 {
        self.invocations.get()
    }

    /// Execute `script` with `ctx` bound as `dv` and `vellum`.
    ///
    /// Returns the script's completion value; a script with no `return`
    /// completes with nil. Side effects against the context's bound node are
    /// visible to the caller either way. Failures carry the Lua diagnostic
    /// trace.
    pub async fn eval(&self, script: &str, ctx: ScriptContext) -> ScriptResult<Value> {
        self.invocations.set(self.invocations.get() + 1);
        let origin = ctx.origin().to_owned();

        let env = self.lua.create_table()?;
        let api = ctx.install(&self.lua)?;
        env.set("dv", api.clone())?;
        env.set("vellum", api)?;
        let meta = self.lua.create_table()?;
        meta.set("__index", self.lua.globals())?;
        env.set_metatable(Some(meta))?;

        debug!(origin = %origin, bytes = script.len(), "evaluating script");
        let value = self
            .lua
            .load(script)
            .set_name(format!("script:{origin}"))
            .set_environment(env)
            .eval_async::<Value>()
            .await?;
        Ok(value)
    }
}
