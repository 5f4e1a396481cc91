//! The refreshable-view base abstraction.

use crate::index::QueryIndex;
use crate::settings::ScriptSettings;
use async_trait::async_trait;
use std::sync::Arc;
use vellum_dom::Node;

/// State every refreshable view holds: the live container it renders into,
/// the query index, and the settings snapshot taken at construction.
///
/// Settings are a snapshot on purpose. A view never consults ambient
/// configuration mid-render; the host rebuilds views when settings change.
#[derive(Clone)]
pub struct ViewState {
    pub container: Node,
    pub index: Arc<QueryIndex>,
    pub settings: Arc<ScriptSettings>,
}

impl ViewState {
    pub fn new(container: Node, index: Arc<QueryIndex>, settings: Arc<ScriptSettings>) -> Self {
        Self {
            container,
            index,
            settings,
        }
    }
}

/// A view the host's refresh scheduler re-renders on demand.
///
/// `render` redoes the full rendering decision from scratch on every call:
/// settings gates, evaluation, commit. There is no incremental diffing of
/// script logic, only of final output. Calls on one instance cannot overlap
/// (the exclusive borrow serializes them); teardown is the scheduler's
/// concern, and a render after the container is detached must not crash but
/// need not do anything useful.
#[async_trait(?Send)]
pub trait Refreshable {
    async fn render(&mut self);
}
