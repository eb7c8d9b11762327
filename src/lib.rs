pub mod backend;
pub mod canvas;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod heatmap;
pub mod registry;
pub mod scale;
pub mod stream;
pub mod surface;
pub mod transition;

pub use config::{BackendConfig, DashboardConfig};
pub use error::{FetchError, Result, VizError};
pub use registry::{AppState, Command, HostTarget, ViewHost};

use backend::Backend;
use geometry::Size;
use stream::Clock;

/// Fetches the start-up net's topology and opens it in a fresh registry.
///
/// # Errors
/// Returns a `VizError` if the backend cannot serve the topology or a view
/// cannot be built from it.
pub async fn open(
    config: &DashboardConfig,
    backend: &dyn Backend,
    container: Size,
    host: &mut dyn ViewHost,
    clock: &dyn Clock,
) -> Result<AppState> {
    log::info!("fetching topology of '{}'", config.net);
    let spec = backend.net_spec(&config.net).await?;

    let mut app = AppState::new(config.view, container);
    app.add_net(spec, host, clock.now())?;
    Ok(app)
}
