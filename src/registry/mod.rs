mod app;
mod net;
mod view;

use std::fmt;

pub use app::AppState;
pub use net::{Net, DEFAULT_VIEW};
pub use view::{ApplyReport, FrameReport, UnknownLayerWarning, View, ViewOptions};

use crate::geometry::{Point, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub(crate) u32);

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net#{}", self.0)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Something the host UI shows for the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostTarget {
    Net(NetId),
    View(ViewId),
}

/// The capabilities the registry needs from the host UI.
///
/// Hosts keep whatever widgets they like per identifier; the registry only
/// tells them when to show, hide or drop one.
pub trait ViewHost {
    fn activate(&mut self, target: HostTarget);
    fn deactivate(&mut self, target: HostTarget);
    fn destroy(&mut self, target: HostTarget);
}

/// A host that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl ViewHost for NullHost {
    fn activate(&mut self, _target: HostTarget) {}
    fn deactivate(&mut self, _target: HostTarget) {}
    fn destroy(&mut self, _target: HostTarget) {}
}

/// A UI event addressed to a specific net or view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SelectNet(NetId),
    SelectView(ViewId),
    ToggleStream(ViewId),
    /// Pointer positions are in surface pixels.
    PointerDown(ViewId, Point),
    PointerMove(ViewId, Point),
    PointerUp(ViewId),
    Zoom {
        view: ViewId,
        anchor: Point,
        factor: f64,
    },
    Pan {
        view: ViewId,
        dx: f64,
        dy: f64,
    },
    ResetViewport(ViewId),
    /// The shared container changed size; every view refits.
    Resize(Size),
}
