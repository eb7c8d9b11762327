/// Severity of an entry in the events panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// A single log entry shown in the event panel.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: Level,
    pub message: String,
}

/// What the user asked for, before it is addressed to a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    Quit,
    ToggleStream,
    NextNet,
    NextView,
    AddView,
    CloseView,
    /// Zoom around a canvas pixel, or around the canvas center.
    Zoom {
        anchor: Option<netviz::geometry::Point>,
        factor: f64,
    },
    Pan {
        dx: f64,
        dy: f64,
    },
    ResetViewport,
    Fit,
    PointerDown(netviz::geometry::Point),
    PointerMove(netviz::geometry::Point),
    PointerUp,
}
