use log::debug;
use serde::de::DeserializeOwned;

use super::{ActivityFrame, Backend, NetSpec};
use crate::error::FetchError;

/// Talks to the dashboard backend over HTTP.
///
/// * `GET {base}/get_activity[?net=NAME]`
/// * `GET {base}/get_net?net=NAME`
///
/// Requests have no timeout: a slow answer simply lands late.
#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpBackend {
    /// Creates a new `HttpBackend`.
    ///
    /// # Arguments
    /// * `base_url` - Scheme, host and port of the backend, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs a blocking GET on the blocking pool and decodes the JSON body.
    async fn get<T>(&self, path: &str, net: Option<&str>) -> Result<T, FetchError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let agent = self.agent.clone();
        let url = format!("{}{path}", self.base_url);
        let net = net.map(str::to_string);

        tokio::task::spawn_blocking(move || {
            let mut request = agent.get(&url);
            if let Some(net) = &net {
                request = request.query("net", net);
            }

            debug!("GET {url}");
            let response = request.call()?;
            response
                .into_json::<T>()
                .map_err(|e| FetchError::Decode(e.to_string()))
        })
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn activity(&self, net: Option<&str>) -> Result<ActivityFrame, FetchError> {
        self.get("/get_activity", net).await
    }

    async fn net_spec(&self, net: &str) -> Result<NetSpec, FetchError> {
        let mut spec: NetSpec = self.get("/get_net", Some(net)).await?;
        if spec.name.is_empty() {
            spec.name = net.to_string();
        }
        Ok(spec)
    }
}

impl From<ureq::Error> for FetchError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => Self::Status(code),
            ureq::Error::Transport(transport) => Self::Transport(transport.to_string()),
        }
    }
}
