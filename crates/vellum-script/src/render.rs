//! Value rendering and diagnostic presentation.
//!
//! `render_value` gives a best-effort human-readable rendering of whatever a
//! script returned; `render_error_pre` is the single diagnostic shape both
//! renderer kinds use.

use crate::context::{resolve_link, LuaNode};
use crate::error::ScriptResult;
use crate::settings::ScriptSettings;
use mlua::{Table, Value};
use vellum_dom::Node;

/// Class carried by every diagnostic node.
pub const ERROR_CLASS: &str = "script-error";

/// Append a fixed-style preformatted diagnostic node holding `message` to
/// `container`, replacing no other content. Returns the new node.
pub fn render_error_pre(container: &Node, message: &str) -> Node {
    let pre = Node::element("pre").with_class(ERROR_CLASS);
    pre.append_text(message);
    container.append_child(&pre);
    pre
}

/// Render a script completion value into `target`.
///
/// Scalars become text; array-like tables become bullet lists (or
/// comma-joined text when `inline`); map-like tables become `key: value`
/// lines; a table with a `path` field renders as a link resolved against
/// `origin`; node handles are appended directly. Nil renders as the
/// configured placeholder.
pub fn render_value(
    value: &Value,
    target: &Node,
    origin: &str,
    settings: &ScriptSettings,
    inline: bool,
) -> ScriptResult<()> {
    match value {
        Value::Nil => target.append_text(&settings.render_null_as),
        Value::Boolean(b) => target.append_text(b.to_string()),
        Value::Integer(i) => target.append_text(i.to_string()),
        Value::Number(n) => target.append_text(n.to_string()),
        Value::String(s) => target.append_text(format!("{}", s.to_string_lossy())),
        Value::Table(t) => render_table(t, target, origin, settings, inline)?,
        Value::UserData(ud) => {
            if let Ok(handle) = ud.borrow::<LuaNode>() {
                target.append_child(handle.node());
            } else {
                target.append_text("<userdata>");
            }
        }
        Value::Function(_) => target.append_text("<function>"),
        Value::Thread(_) => target.append_text("<thread>"),
        other => target.append_text(format!("<{}>", other.type_name())),
    }
    Ok(())
}

fn render_table(
    table: &Table,
    target: &Node,
    origin: &str,
    settings: &ScriptSettings,
    inline: bool,
) -> ScriptResult<()> {
    // Link shape: { path = "...", display = "..."? }
    if table.raw_len() == 0 && table.contains_key("path")? {
        let path: String = table.get("path")?;
        let display: Option<String> = table.get("display")?;
        let anchor = Node::element("a").with_class("internal-link");
        anchor.set_attr("href", resolve_link(origin, &path));
        anchor.append_text(display.unwrap_or(path));
        target.append_child(&anchor);
        return Ok(());
    }

    if table.raw_len() > 0 {
        if inline {
            let mut first = true;
            for item in table.sequence_values::<Value>() {
                let item = item?;
                if !first {
                    target.append_text(", ");
                }
                first = false;
                render_value(&item, target, origin, settings, true)?;
            }
        } else {
            let list = Node::element("ul");
            for item in table.sequence_values::<Value>() {
                let item = item?;
                let li = Node::element("li");
                render_value(&item, &li, origin, settings, true)?;
                list.append_child(&li);
            }
            target.append_child(&list);
        }
        return Ok(());
    }

    // Map-like: sorted for deterministic markup, so the pre-commit diff
    // sees stable output across renders.
    let mut entries: Vec<(String, Value)> = Vec::new();
    for pair in table.pairs::<Value, Value>() {
        let (key, value) = pair?;
        entries.push((display_key(&key), value));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    if inline {
        let mut first = true;
        for (key, value) in &entries {
            if !first {
                target.append_text("; ");
            }
            first = false;
            target.append_text(format!("{key}: "));
            render_value(value, target, origin, settings, true)?;
        }
    } else {
        for (key, value) in &entries {
            let line = Node::element("p");
            line.append_text(format!("{key}: "));
            render_value(value, &line, origin, settings, true)?;
            target.append_child(&line);
        }
    }
    Ok(())
}

fn display_key(key: &Value) -> String {
    match key {
        Value::String(s) => format!("{}", s.to_string_lossy()),
        Value::Integer(i) => i.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Boolean(b) => b.to_string(),
        other => format!("<{}>", other.type_name()),
    }
}
