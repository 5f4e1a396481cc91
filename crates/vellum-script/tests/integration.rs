//! Integration tests for the block and inline script renderers.

use std::rc::Rc;
use std::sync::Arc;

use serde_json::json;
use vellum_dom::Node;
use vellum_script::{
    BlockRenderer, InlineRenderer, QueryIndex, Refreshable, Sandbox, ScriptSettings, ViewState,
    ERROR_CLASS, INLINE_DISABLED_NOTICE,
};

fn state_with(settings: ScriptSettings) -> ViewState {
    ViewState::new(
        Node::element("div"),
        Arc::new(QueryIndex::new()),
        Arc::new(settings),
    )
}

fn sandbox() -> Rc<Sandbox> {
    Rc::new(Sandbox::new().unwrap())
}

/// Attach a placeholder node for an inline renderer and return it.
fn placeholder(container: &Node) -> Node {
    let node = Node::element("code");
    node.append_text("pending");
    container.append_child(&node);
    node
}

fn diagnostics(container: &Node) -> Vec<Node> {
    fn walk(node: &Node, out: &mut Vec<Node>) {
        for child in node.children() {
            if child.outer_markup().starts_with(&format!("<pre class=\"{ERROR_CLASS}\"")) {
                out.push(child.clone());
            }
            walk(&child, out);
        }
    }
    let mut out = Vec::new();
    walk(container, &mut out);
    out
}

// ============================================================================
// BLOCK RENDERER
// ============================================================================

#[tokio::test]
async fn test_block_commits_side_effect_output() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    let mut view = BlockRenderer::new(sandbox(), r#"dv.el("p", "hi")"#, state, "notes/a.md");

    view.render().await;

    assert_eq!(container.child_count(), 1);
    let p = container.first_child().unwrap();
    assert_eq!(p.tag().as_deref(), Some("p"));
    assert_eq!(p.text_content(), "hi");
    assert!(diagnostics(&container).is_empty());
}

#[tokio::test]
async fn test_block_failure_replaces_content_with_one_diagnostic() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    container.append_child(&Node::element("p").with_class("old"));

    let mut view = BlockRenderer::new(sandbox(), r#"error("boom")"#, state, "notes/a.md");
    view.render().await;

    assert_eq!(container.child_count(), 1, "prior content must be gone");
    let diags = diagnostics(&container);
    assert_eq!(diags.len(), 1);
    let text = diags[0].text_content();
    assert!(text.contains("Evaluation Error:"), "got: {text}");
    assert!(text.contains("boom"), "got: {text}");
}

#[tokio::test]
async fn test_block_throw_before_any_output_still_diagnoses() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    let mut view = BlockRenderer::new(
        sandbox(),
        r#"this is not lua at all ("#,
        state,
        "notes/a.md",
    );
    view.render().await;

    assert_eq!(diagnostics(&container).len(), 1);
}

#[tokio::test]
async fn test_block_empty_success_commits_empty_container() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    container.append_child(&Node::element("p").with_class("stale"));

    let mut view = BlockRenderer::new(sandbox(), "return nil", state, "notes/a.md");
    view.render().await;

    assert_eq!(container.child_count(), 0);
    assert!(diagnostics(&container).is_empty());
}

#[tokio::test]
async fn test_block_disabled_never_invokes_sandbox() {
    let settings = ScriptSettings {
        enable_scripts: false,
        ..ScriptSettings::enabled()
    };
    let state = state_with(settings);
    let container = state.container.clone();
    let sandbox = sandbox();

    let mut view = BlockRenderer::new(sandbox.clone(), r#"dv.el("p", "hi")"#, state, "notes/a.md");
    view.render().await;

    assert_eq!(sandbox.invocation_count(), 0);
    let diags = diagnostics(&container);
    assert_eq!(diags.len(), 1);
    assert!(diags[0].text_content().contains("disabled"));
}

#[tokio::test]
async fn test_block_noop_commit_preserves_live_nodes() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    let mut view = BlockRenderer::new(sandbox(), r#"dv.el("p", "stable")"#, state, "notes/a.md");

    view.render().await;
    let first = container.first_child().unwrap();
    let markup = container.inner_markup();

    view.render().await;
    assert_eq!(container.inner_markup(), markup);
    assert!(
        container.first_child().unwrap().ptr_eq(&first),
        "unchanged output must not replace live nodes"
    );
}

#[tokio::test]
async fn test_block_always_commits_with_check_disabled() {
    let settings = ScriptSettings {
        check_markup_before_rerender: false,
        ..ScriptSettings::enabled()
    };
    let state = state_with(settings);
    let container = state.container.clone();
    let mut view = BlockRenderer::new(sandbox(), r#"dv.el("p", "stable")"#, state, "notes/a.md");

    view.render().await;
    let first = container.first_child().unwrap();

    view.render().await;
    assert!(
        !container.first_child().unwrap().ptr_eq(&first),
        "with the check off every render commits fresh nodes"
    );
    assert_eq!(container.text_content(), "stable");
}

#[tokio::test]
async fn test_block_recovers_after_failure() {
    // Same container, new script: next render replaces the diagnostic.
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();

    let mut bad = BlockRenderer::new(sandbox(), r#"error("first")"#, state.clone(), "notes/a.md");
    bad.render().await;
    assert_eq!(diagnostics(&container).len(), 1);

    let mut good = BlockRenderer::new(sandbox(), r#"dv.el("p", "ok")"#, state, "notes/a.md");
    good.render().await;
    assert!(diagnostics(&container).is_empty());
    assert_eq!(container.text_content(), "ok");
}

#[tokio::test]
async fn test_block_script_can_suspend() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    let mut view = BlockRenderer::new(
        sandbox(),
        r#"dv.wait(0.01) dv.el("p", "later")"#,
        state,
        "notes/a.md",
    );
    view.render().await;
    assert_eq!(container.text_content(), "later");
}

// ============================================================================
// INLINE RENDERER
// ============================================================================

#[tokio::test]
async fn test_inline_replaces_target_with_result() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    let old = placeholder(&container);

    let mut view = InlineRenderer::new(sandbox(), "return 1 + 1", state, old.clone(), "notes/a.md");
    view.render().await;

    assert!(!old.is_attached(), "old target must be detached");
    assert!(view.target().is_attached());
    assert_eq!(view.target().text_content(), "2");
    assert_eq!(container.text_content(), "2");
}

#[tokio::test]
async fn test_inline_nil_result_keeps_side_effects() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    let old = placeholder(&container);

    let mut view = InlineRenderer::new(sandbox(), r#"dv.text("made it")"#, state, old, "notes/a.md");
    view.render().await;

    assert_eq!(view.target().text_content(), "made it");
    assert!(diagnostics(&container).is_empty());
}

#[tokio::test]
async fn test_inline_failure_keeps_target_and_appends_diagnostic() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    let old = placeholder(&container);

    let mut view = InlineRenderer::new(sandbox(), r#"error("nope")"#, state, old.clone(), "notes/a.md");
    view.render().await;

    assert!(old.is_attached(), "failure before replacement keeps the target");
    assert!(view.target().ptr_eq(&old));
    let diags = diagnostics(&container);
    assert_eq!(diags.len(), 1);
    let text = diags[0].text_content();
    assert!(text.contains("for inline script 'error(\"nope\")'"), "got: {text}");
    assert!(text.contains("nope"));
}

#[tokio::test]
async fn test_inline_failure_diagnostic_is_not_duplicated() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    let old = placeholder(&container);

    let mut view = InlineRenderer::new(sandbox(), r#"error("again")"#, state, old, "notes/a.md");
    view.render().await;
    view.render().await;

    // Stale errorbox is removed at the start of the next render.
    assert_eq!(diagnostics(&container).len(), 1);
}

#[tokio::test]
async fn test_inline_previous_result_survives_new_failure() {
    // A successful result stays visible alongside a later failure's
    // diagnostic: render a good script, then a failing one sharing the
    // live target.
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    let old = placeholder(&container);

    let mut good = InlineRenderer::new(sandbox(), "return 7", state.clone(), old, "notes/a.md");
    good.render().await;
    let live = good.target().clone();
    assert_eq!(live.text_content(), "7");

    let mut bad = InlineRenderer::new(sandbox(), r#"error("later")"#, state, live.clone(), "notes/a.md");
    bad.render().await;

    assert!(live.is_attached(), "last good result remains visible");
    assert_eq!(live.text_content(), "7");
    assert_eq!(diagnostics(&container).len(), 1);
}

#[tokio::test]
async fn test_inline_disabled_flags() {
    for settings in [
        ScriptSettings {
            enable_scripts: false,
            ..ScriptSettings::enabled()
        },
        ScriptSettings {
            enable_inline_scripts: false,
            ..ScriptSettings::enabled()
        },
    ] {
        let state = state_with(settings);
        let container = state.container.clone();
        let old = placeholder(&container);
        let sandbox = sandbox();

        let mut view =
            InlineRenderer::new(sandbox.clone(), "return 1", state, old.clone(), "notes/a.md");
        view.render().await;

        assert_eq!(sandbox.invocation_count(), 0);
        assert!(!old.is_attached());
        assert_eq!(view.target().text_content(), INLINE_DISABLED_NOTICE);
    }
}

#[tokio::test]
async fn test_inline_only_flag_leaves_blocks_running() {
    let settings = ScriptSettings {
        enable_inline_scripts: false,
        ..ScriptSettings::enabled()
    };
    let shared = sandbox();

    let inline_state = state_with(settings.clone());
    let old = placeholder(&inline_state.container);
    let mut inline = InlineRenderer::new(shared.clone(), "return 1", inline_state, old, "a.md");
    inline.render().await;
    assert_eq!(shared.invocation_count(), 0);

    let block_state = state_with(settings);
    let block_container = block_state.container.clone();
    let mut block = BlockRenderer::new(shared.clone(), r#"dv.el("p", "runs")"#, block_state, "a.md");
    block.render().await;

    assert_eq!(shared.invocation_count(), 1);
    assert_eq!(block_container.text_content(), "runs");
}

#[tokio::test]
async fn test_inline_list_result() {
    let state = state_with(ScriptSettings::enabled());
    let container = state.container.clone();
    let old = placeholder(&container);

    let mut view = InlineRenderer::new(sandbox(), "return {1, 2, 3}", state, old, "notes/a.md");
    view.render().await;

    assert_eq!(view.target().text_content(), "1, 2, 3");
}

// ============================================================================
// QUERY INDEX AND SETTINGS PLUMBING
// ============================================================================

#[tokio::test]
async fn test_block_reads_index_and_rerenders_on_change() {
    let index = Arc::new(QueryIndex::new());
    index.insert_page("projects/vellum.md", json!({"title": "Vellum"}));

    let state = ViewState::new(
        Node::element("div"),
        index.clone(),
        Arc::new(ScriptSettings::enabled()),
    );
    let container = state.container.clone();
    let script = r#"
        local page = dv.page("/projects/vellum.md")
        dv.el("p", page and page.title or dv.null_placeholder())
    "#;
    let mut view = BlockRenderer::new(sandbox(), script, state, "notes/a.md");

    view.render().await;
    assert_eq!(container.text_content(), "Vellum");

    index.insert_page("projects/vellum.md", json!({"title": "Vellum II"}));
    view.render().await;
    assert_eq!(container.text_content(), "Vellum II");

    index.remove_page("projects/vellum.md");
    view.render().await;
    assert_eq!(container.text_content(), "-");
}

#[tokio::test]
async fn test_settings_loaded_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(
        &path,
        "enable_scripts = true\nenable_inline_scripts = true\nrender_null_as = \"(none)\"\n",
    )
    .unwrap();

    let settings = ScriptSettings::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(settings.enable_scripts);
    assert_eq!(settings.render_null_as, "(none)");

    let state = state_with(settings);
    let container = state.container.clone();
    let old = placeholder(&container);
    let mut view = InlineRenderer::new(sandbox(), "return nil", state, old, "a.md");
    view.render().await;

    // Nil completion leaves the fresh node empty rather than rendering the
    // placeholder; the configured text is reserved for explicit renderings.
    assert_eq!(view.target().text_content(), "");
}
