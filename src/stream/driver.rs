use std::sync::Arc;

use log::debug;
use tokio::{runtime::Handle, sync::mpsc};
use tokio_util::sync::CancellationToken;

use super::FetchTicket;
use crate::{
    backend::{ActivityFrame, Backend},
    error::FetchError,
    registry::ViewId,
};

/// A fetch that a view's stream controller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub view: ViewId,
    pub net: String,
    pub ticket: FetchTicket,
}

/// A finished fetch, routed back to the view that asked for it.
#[derive(Debug)]
pub struct FetchOutcome {
    pub request: FetchRequest,
    pub result: Result<ActivityFrame, FetchError>,
}

/// Runs fetches in the background and hands their results back to the UI thread.
///
/// One task per request; results come back over a channel that the owner
/// drains once per frame, so every mutation still happens on the UI thread.
pub struct FetchDriver {
    backend: Arc<dyn Backend>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<FetchOutcome>,
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
    shutdown: CancellationToken,
}

impl FetchDriver {
    /// Creates a new `FetchDriver`.
    ///
    /// # Arguments
    /// * `backend` - Where activations come from.
    /// * `runtime` - The runtime the fetch tasks are spawned on.
    pub fn new(backend: Arc<dyn Backend>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            runtime,
            tx,
            rx,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Issues the fetch for `request` without waiting for it.
    pub fn spawn(&self, request: FetchRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let shutdown = self.shutdown.clone();

        self.runtime.spawn(async move {
            let net = request.net.clone();
            let result = tokio::select! {
                _ = shutdown.cancelled() => return,
                result = backend.activity(Some(&net)) => result,
            };

            // The receiver is gone once the driver is dropped.
            let _ = tx.send(FetchOutcome { request, result });
        });
    }

    /// Collects every outcome that has arrived so far. Never blocks.
    pub fn drain(&mut self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Waits for the next outcome. Mostly useful for headless hosts and tests.
    pub async fn next(&mut self) -> Option<FetchOutcome> {
        self.rx.recv().await
    }

    /// Abandons every in-flight fetch.
    pub fn shutdown(&self) {
        debug!("cancelling in-flight fetches");
        self.shutdown.cancel();
    }
}

impl Drop for FetchDriver {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
