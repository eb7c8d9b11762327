use std::{env, sync::Arc, time::Duration};

use log::info;

use crate::{
    backend::{Backend, HttpBackend, MockBackend, EXAMPLE_NET},
    error::{Result, VizError},
    heatmap::HeatmapStyle,
    registry::ViewOptions,
};

pub const URL_VAR: &str = "NETVIZ_URL";
pub const NET_VAR: &str = "NETVIZ_NET";
pub const SEED_VAR: &str = "NETVIZ_SEED";

const DEFAULT_SEED: u64 = 42;

/// Where activations come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Http { base_url: String },
    /// The in-process demo backend.
    Mock { seed: u64 },
}

impl BackendConfig {
    pub fn connect(&self) -> Arc<dyn Backend> {
        match self {
            Self::Http { base_url } => {
                info!("using backend at {base_url}");
                Arc::new(HttpBackend::new(base_url.as_str()))
            }
            Self::Mock { seed } => {
                info!("using the mock backend (seed {seed})");
                Arc::new(MockBackend::new(*seed))
            }
        }
    }
}

/// Start-up settings of a dashboard. Nothing here changes after start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub backend: BackendConfig,
    /// The net opened at start-up.
    pub net: String,
    pub view: ViewOptions,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::Mock { seed: DEFAULT_SEED },
            net: EXAMPLE_NET.to_string(),
            view: ViewOptions {
                style: HeatmapStyle::default(),
                layer_gap: 16.0,
                stream_interval: Duration::from_millis(100),
            },
        }
    }
}

impl DashboardConfig {
    /// Reads `NETVIZ_URL`, `NETVIZ_NET` and `NETVIZ_SEED` from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any variable source; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(net) = non_empty(NET_VAR) {
            config.net = net;
        }

        config.backend = match (non_empty(URL_VAR), non_empty(SEED_VAR)) {
            (Some(url), _) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(VizError::InvalidConfig(format!(
                        "{URL_VAR} must be an http(s) url, got '{url}'"
                    )));
                }
                BackendConfig::Http { base_url: url }
            }
            (None, Some(seed)) => {
                let seed = seed.trim().parse().map_err(|e| {
                    VizError::InvalidConfig(format!("{SEED_VAR} must be an integer: {e}"))
                })?;
                BackendConfig::Mock { seed }
            }
            (None, None) => config.backend,
        };

        Ok(config)
    }
}
