use super::ViewId;
use crate::backend::NetSpec;

/// Name of the view every net is created with.
pub const DEFAULT_VIEW: &str = "defaultView";

/// One network: its topology and the views that draw it.
#[derive(Debug, Clone)]
pub struct Net {
    pub(crate) name: String,
    pub(crate) spec: NetSpec,
    // Tab order.
    pub(crate) views: Vec<ViewId>,
    pub(crate) default_view: ViewId,
    pub(crate) active_view: ViewId,
}

impl Net {
    pub(crate) fn new(spec: NetSpec, default_view: ViewId) -> Self {
        Self {
            name: spec.name.clone(),
            spec,
            views: vec![default_view],
            default_view,
            active_view: default_view,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &NetSpec {
        &self.spec
    }

    pub fn views(&self) -> &[ViewId] {
        &self.views
    }

    pub fn default_view(&self) -> ViewId {
        self.default_view
    }

    pub fn active_view(&self) -> ViewId {
        self.active_view
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.views.contains(&view)
    }

    /// The view after the active one, wrapping around.
    pub fn next_view(&self) -> ViewId {
        let idx = self
            .views
            .iter()
            .position(|&v| v == self.active_view)
            .unwrap_or(0);
        self.views[(idx + 1) % self.views.len()]
    }
}
