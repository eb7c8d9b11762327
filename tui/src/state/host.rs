use std::collections::HashSet;

use log::debug;
use netviz::{HostTarget, ViewHost};

/// Tracks which tabs the terminal shows. Widgets are redrawn every frame, so
/// visibility is the only per-target state.
#[derive(Debug, Default)]
pub struct TabHost {
    shown: HashSet<HostTarget>,
}

impl TabHost {
    pub fn is_shown(&self, target: HostTarget) -> bool {
        self.shown.contains(&target)
    }
}

impl ViewHost for TabHost {
    fn activate(&mut self, target: HostTarget) {
        debug!("show {target:?}");
        self.shown.insert(target);
    }

    fn deactivate(&mut self, target: HostTarget) {
        debug!("hide {target:?}");
        self.shown.remove(&target);
    }

    fn destroy(&mut self, target: HostTarget) {
        debug!("drop {target:?}");
        self.shown.remove(&target);
    }
}
