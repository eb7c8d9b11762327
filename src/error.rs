use std::{error::Error, fmt};

use crate::grid::LayerShape;

/// The crate's result type.
pub type Result<T> = std::result::Result<T, VizError>;

/// All errors that can occur while building or driving a dashboard.
#[derive(Debug)]
pub enum VizError {
    /// A layer shape with zero rows/columns or an unsupported rank.
    InvalidShape(String),
    /// Nested activation rows of differing lengths.
    MalformedGrid {
        row: usize,
        expected: usize,
        got: usize,
    },
    /// New activation data disagrees with a heatmap's fixed shape.
    ShapeMismatch {
        layer: Option<String>,
        expected: LayerShape,
        got: LayerShape,
    },
    /// Two heatmaps in the same canvas share a layer name.
    DuplicateLayerName(String),
    UnknownNet(String),
    DuplicateNetName(String),
    UnknownView(String),
    DuplicateViewName(String),
    CannotRemoveDefaultView(String),
    /// Invalid startup configuration.
    InvalidConfig(String),
    /// The backend could not be reached or answered garbage.
    Fetch(FetchError),
}

impl VizError {
    /// Attaches a layer name to a `ShapeMismatch` produced by the grid layer.
    pub(crate) fn for_layer(self, name: &str) -> Self {
        match self {
            Self::ShapeMismatch {
                layer: None,
                expected,
                got,
            } => Self::ShapeMismatch {
                layer: Some(name.to_string()),
                expected,
                got,
            },
            other => other,
        }
    }
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            Self::MalformedGrid { row, expected, got } => write!(
                f,
                "malformed grid: row {row} has {got} values, expected {expected}"
            ),
            Self::ShapeMismatch {
                layer: Some(layer),
                expected,
                got,
            } => write!(
                f,
                "shape mismatch for layer '{layer}': expected {expected}, got {got}"
            ),
            Self::ShapeMismatch {
                layer: None,
                expected,
                got,
            } => write!(f, "shape mismatch: expected {expected}, got {got}"),
            Self::DuplicateLayerName(name) => {
                write!(f, "layer '{name}' is already registered in this canvas")
            }
            Self::UnknownNet(name) => write!(f, "unknown net: {name}"),
            Self::DuplicateNetName(name) => write!(f, "net '{name}' is already open"),
            Self::UnknownView(name) => write!(f, "unknown view: {name}"),
            Self::DuplicateViewName(name) => write!(f, "view '{name}' already exists"),
            Self::CannotRemoveDefaultView(name) => {
                write!(f, "the default view of net '{name}' cannot be removed")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Fetch(e) => write!(f, "fetch failed: {e}"),
        }
    }
}

impl Error for VizError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FetchError> for VizError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

/// Failures while talking to the activity backend.
///
/// These never abort streaming: the cycle is skipped and the next tick tries again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection refused, DNS failure, broken pipe...
    Transport(String),
    /// The backend answered with a non-success status code.
    Status(u16),
    /// The body was not the JSON we expected.
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Status(code) => write!(f, "backend answered with status {code}"),
            Self::Decode(msg) => write!(f, "invalid response body: {msg}"),
        }
    }
}

impl Error for FetchError {}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
