use std::collections::HashMap;

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{ActivityFrame, Backend, LayerData, LayerSpec, NetSpec};
use crate::{error::FetchError, grid::LayerShape};

pub const EXAMPLE_NET: &str = "ExampleNet";

// Random-walk step size per request.
const DRIFT: f32 = 0.1;

struct MockLayer {
    spec: LayerSpec,
    values: Vec<f32>,
}

struct MockState {
    rng: StdRng,
    // Keyed by net name, layers in spec order.
    nets: HashMap<String, (NetSpec, Vec<MockLayer>)>,
    default_net: String,
}

/// An in-process backend that serves drifting random activations.
///
/// Each call to `activity` nudges every value by `0.1 * (u - 0.5)`, `u` uniform
/// in `[0, 1)`. Values are not clamped.
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    /// Creates a mock serving only `ExampleNet`.
    ///
    /// # Arguments
    /// * `seed` - Seed for the activity generator.
    pub fn new(seed: u64) -> Self {
        let backend = Self {
            state: Mutex::new(MockState {
                rng: StdRng::seed_from_u64(seed),
                nets: HashMap::new(),
                default_net: EXAMPLE_NET.to_string(),
            }),
        };
        backend.register(example_net());
        backend
    }

    /// Adds (or replaces) a network. Its initial activations are uniform in `[0, 1)`.
    pub fn register(&self, spec: NetSpec) {
        let mut state = self.state.lock();
        let layers = spec
            .layers
            .iter()
            .map(|layer| MockLayer {
                spec: layer.clone(),
                values: (0..layer.shape.len())
                    .map(|_| state.rng.random::<f32>())
                    .collect(),
            })
            .collect();

        state.nets.insert(spec.name.clone(), (spec, layers));
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn activity(&self, net: Option<&str>) -> Result<ActivityFrame, FetchError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let name = net.unwrap_or(state.default_net.as_str()).to_string();
        let (_, layers) = state.nets.get_mut(&name).ok_or(FetchError::Status(404))?;

        let mut frame = ActivityFrame::new();
        for layer in layers.iter_mut() {
            for v in layer.values.iter_mut() {
                *v += DRIFT * (state.rng.random::<f32>() - 0.5);
            }

            let data = if layer.spec.is_vector {
                LayerData::Vector(layer.values.clone())
            } else {
                let columns = layer.spec.shape.columns();
                LayerData::Matrix(layer.values.chunks(columns).map(<[f32]>::to_vec).collect())
            };
            frame.insert(layer.spec.name.clone(), data);
        }

        Ok(frame)
    }

    async fn net_spec(&self, net: &str) -> Result<NetSpec, FetchError> {
        let state = self.state.lock();
        state
            .nets
            .get(net)
            .map(|(spec, _)| spec.clone())
            .ok_or(FetchError::Status(404))
    }
}

/// The demo topology the mock serves by default.
pub fn example_net() -> NetSpec {
    let layer = |name: &str, dims: &[usize], projections: &[&str]| LayerSpec {
        name: name.to_string(),
        // SAFETY: Every descriptor below has one or two positive dimensions.
        shape: LayerShape::from_dims(dims).unwrap(),
        is_vector: dims.len() == 1,
        projections: projections.iter().map(|p| p.to_string()).collect(),
    };

    NetSpec {
        name: EXAMPLE_NET.to_string(),
        layers: vec![
            layer("Input", &[10, 5], &["layer2"]),
            layer("Hidden1", &[5, 10], &["layer3", "layer1"]),
            layer("Hidden2", &[5, 3], &["layer3", "layer1"]),
            layer("Output", &[5], &["layer2"]),
        ],
    }
}
