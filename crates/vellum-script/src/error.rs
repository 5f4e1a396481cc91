//! Script engine error types

use thiserror::Error;

/// Errors surfaced by the script engine.
///
/// Anything a running script can cause — a syntax error, a runtime error, a
/// rejected async operation, or value rendering choking on its result —
/// lands in `Evaluation`. Renderers catch it at their boundary and turn it
/// into a diagnostic node; nothing propagates to the refresh scheduler.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script failed to load or run. Carries the Lua diagnostic trace.
    #[error("{0}")]
    Evaluation(#[from] mlua::Error),

    /// Settings source could not be parsed.
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),
}

/// Specialized Result type for script engine operations
pub type ScriptResult<T> = Result<T, ScriptError>;
