mod http;
mod mock;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use http::HttpBackend;
pub use mock::{example_net, MockBackend, EXAMPLE_NET};

use crate::{
    error::{FetchError, Result, VizError},
    grid::{ActivationGrid, LayerShape},
};

/// One layer's activations as sent by the backend.
///
/// 1-D layers arrive as a flat list and are read as a column vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerData {
    Matrix(Vec<Vec<f32>>),
    Vector(Vec<f32>),
}

impl LayerData {
    pub fn into_grid(self) -> Result<ActivationGrid> {
        match self {
            Self::Matrix(rows) => ActivationGrid::from_rows(rows),
            Self::Vector(values) => ActivationGrid::column(values),
        }
    }
}

/// A whole poll response: layer name to activations.
pub type ActivityFrame = BTreeMap<String, LayerData>;

/// Topology of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub name: String,
    pub shape: LayerShape,
    /// Declared with a single dimension.
    pub is_vector: bool,
    pub projections: Vec<String>,
}

/// Topology of a network: its layers in layout order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNetSpec")]
pub struct NetSpec {
    pub name: String,
    pub layers: Vec<LayerSpec>,
}

impl NetSpec {
    pub fn layer(&self, name: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.name == name)
    }
}

#[derive(Deserialize)]
struct RawNetSpec {
    #[serde(default)]
    name: String,
    // Insertion ordered, the key order is the left to right layout.
    layers: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct RawLayerSpec {
    shape: Vec<usize>,
    #[serde(default)]
    projections: Vec<String>,
}

impl TryFrom<RawNetSpec> for NetSpec {
    type Error = VizError;

    fn try_from(raw: RawNetSpec) -> Result<Self> {
        let layers = raw
            .layers
            .into_iter()
            .map(|(name, value)| {
                let layer: RawLayerSpec = serde_json::from_value(value).map_err(|e| {
                    VizError::InvalidShape(format!("layer '{name}': {e}"))
                })?;
                let shape = LayerShape::from_dims(&layer.shape)
                    .map_err(|e| VizError::InvalidShape(format!("layer '{name}': {e}")))?;

                Ok(LayerSpec {
                    name,
                    shape,
                    is_vector: layer.shape.len() == 1,
                    projections: layer.projections,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: raw.name,
            layers,
        })
    }
}

/// Client side of the activity backend.
///
/// Both calls must be safe to repeat at a fixed interval.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Fetches the current activations, optionally for a single network.
    async fn activity(&self, net: Option<&str>) -> std::result::Result<ActivityFrame, FetchError>;

    /// Fetches a network's layer topology.
    async fn net_spec(&self, net: &str) -> std::result::Result<NetSpec, FetchError>;
}
