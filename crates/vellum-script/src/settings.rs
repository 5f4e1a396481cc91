//! Renderer settings snapshot.
//!
//! Views take an `Arc<ScriptSettings>` at construction and read only that
//! snapshot; there is no ambient global to consult mid-render. Hosts load
//! settings from TOML and rebuild views when they change.

use crate::error::ScriptResult;
use serde::{Deserialize, Serialize};

/// Feature toggles consulted at the start of every render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    /// Master switch for script execution, block and inline alike.
    pub enable_scripts: bool,

    /// Inline script execution; has no effect unless `enable_scripts` is on.
    pub enable_inline_scripts: bool,

    /// Skip the commit when a block re-render produced identical markup,
    /// leaving the live nodes untouched.
    pub check_markup_before_rerender: bool,

    /// Placeholder text rendered for a nil result value.
    pub render_null_as: String,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            enable_scripts: false,
            enable_inline_scripts: false,
            check_markup_before_rerender: true,
            render_null_as: "-".into(),
        }
    }
}

impl ScriptSettings {
    /// Parse settings from TOML; missing keys fall back to defaults.
    pub fn from_toml(source: &str) -> ScriptResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Snapshot with both execution flags on. Hosts that gate elsewhere
    /// (and most tests) start from this.
    pub fn enabled() -> Self {
        Self {
            enable_scripts: true,
            enable_inline_scripts: true,
            ..Self::default()
        }
    }
}
