use std::{sync::Arc, time::Duration};

use netviz::{
    backend::{ActivityFrame, Backend, LayerData, MockBackend, NetSpec},
    geometry::Size,
    registry::{ApplyReport, NullHost, ViewId},
    stream::{Clock, FetchDriver, ManualClock, TicketStatus},
    AppState, Command, DashboardConfig, FetchError,
};
use tokio::{
    runtime::Handle,
    sync::{mpsc, oneshot},
};

type Gate = oneshot::Sender<Result<ActivityFrame, FetchError>>;

/// A backend whose fetches only complete when the test opens their gate.
struct GatedBackend {
    spec: NetSpec,
    pending: mpsc::UnboundedSender<Gate>,
}

impl GatedBackend {
    fn new() -> (Self, mpsc::UnboundedReceiver<Gate>) {
        let spec = serde_json::from_str(
            r#"{"name": "net", "layers": {"hidden": {"shape": [4, 4]}, "output": {"shape": [2]}}}"#,
        )
        .unwrap();
        let (pending, gates) = mpsc::unbounded_channel();
        (Self { spec, pending }, gates)
    }
}

#[async_trait::async_trait]
impl Backend for GatedBackend {
    async fn activity(&self, _net: Option<&str>) -> Result<ActivityFrame, FetchError> {
        let (gate, opened) = oneshot::channel();
        self.pending
            .send(gate)
            .map_err(|_| FetchError::Transport("test finished".into()))?;
        opened
            .await
            .unwrap_or_else(|_| Err(FetchError::Transport("gate dropped".into())))
    }

    async fn net_spec(&self, _net: &str) -> Result<NetSpec, FetchError> {
        Ok(self.spec.clone())
    }
}

struct Harness {
    app: AppState,
    view: ViewId,
    driver: FetchDriver,
    gates: mpsc::UnboundedReceiver<Gate>,
    clock: ManualClock,
}

async fn harness() -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let (backend, gates) = GatedBackend::new();
    let backend: Arc<dyn Backend> = Arc::new(backend);
    let clock = ManualClock::new();

    let app = netviz::open(
        &DashboardConfig::default(),
        backend.as_ref(),
        Size::new(800.0, 600.0),
        &mut NullHost,
        &clock,
    )
    .await
    .unwrap();
    let view = app.active_view().unwrap();

    Harness {
        app,
        view,
        driver: FetchDriver::new(backend, Handle::current()),
        gates,
        clock,
    }
}

impl Harness {
    fn toggle(&mut self) {
        self.app
            .dispatch(Command::ToggleStream(self.view), &mut NullHost, self.clock.now())
            .unwrap();
    }

    /// Advances one interval and issues every fetch that became due.
    async fn tick(&mut self) -> Gate {
        self.clock.advance(self.app.options().stream_interval);
        for request in self.app.poll(self.clock.now()) {
            self.driver.spawn(request);
        }
        self.gates.recv().await.unwrap()
    }

    fn hidden_values(&self) -> Vec<f32> {
        let view = self.app.view(self.view).unwrap();
        let hidden = view.canvas().get("hidden").unwrap();
        hidden.grid().flatten_row_major().collect()
    }
}

fn hidden_frame() -> ActivityFrame {
    let mut rows = vec![vec![0.0; 4]; 4];
    rows[0][0] = 1.0;
    [("hidden".to_string(), LayerData::Matrix(rows))].into()
}

#[tokio::test]
async fn test_live_response_is_applied() {
    let mut h = harness().await;
    h.toggle();

    let gate = h.tick().await;
    gate.send(Ok(hidden_frame())).unwrap();
    let outcome = h.driver.next().await.unwrap();
    let report = h.app.apply(outcome, h.clock.now()).unwrap();

    let report = match report {
        ApplyReport::Applied(report) => report,
        other => panic!("expected the frame to be applied, got {other:?}"),
    };
    assert_eq!(report.updated, vec!["hidden"]);
    assert_eq!(report.missing, vec!["output"]);
    assert!(report.is_clean());
    assert_eq!(h.hidden_values()[0], 1.0);
}

#[tokio::test]
async fn test_response_after_stop_does_not_mutate() {
    let mut h = harness().await;
    h.toggle();

    let gate = h.tick().await;
    h.toggle();
    gate.send(Ok(hidden_frame())).unwrap();
    let outcome = h.driver.next().await.unwrap();
    let report = h.app.apply(outcome, h.clock.now()).unwrap();

    assert!(matches!(report, ApplyReport::Dropped(TicketStatus::Stopped)));
    assert!(h.hidden_values().iter().all(|&v| v == 0.0));
    assert!(!h.app.view(h.view).unwrap().stream().is_streaming());
}

#[tokio::test]
async fn test_failed_fetch_is_retried_next_tick() {
    let mut h = harness().await;
    h.toggle();

    let gate = h.tick().await;
    gate.send(Err(FetchError::Status(503))).unwrap();
    let outcome = h.driver.next().await.unwrap();
    assert!(matches!(
        h.app.apply(outcome, h.clock.now()),
        Some(ApplyReport::Failed(FetchError::Status(503)))
    ));

    let gate = h.tick().await;
    gate.send(Ok(hidden_frame())).unwrap();
    let outcome = h.driver.next().await.unwrap();
    assert!(matches!(
        h.app.apply(outcome, h.clock.now()),
        Some(ApplyReport::Applied(_))
    ));
}

#[tokio::test]
async fn test_out_of_order_responses_keep_newest() {
    let mut h = harness().await;
    h.toggle();

    let first = h.tick().await;
    let second = h.tick().await;

    let mut newer = hidden_frame();
    newer.insert("output".into(), LayerData::Vector(vec![0.5, 0.5]));
    second.send(Ok(newer)).unwrap();
    let outcome = h.driver.next().await.unwrap();
    assert!(matches!(h.app.apply(outcome, h.clock.now()), Some(ApplyReport::Applied(_))));

    first
        .send(Ok([("hidden".to_string(), LayerData::Matrix(vec![vec![0.0; 4]; 4]))].into()))
        .unwrap();
    let outcome = h.driver.next().await.unwrap();
    assert!(matches!(
        h.app.apply(outcome, h.clock.now()),
        Some(ApplyReport::Dropped(TicketStatus::Stale))
    ));
    assert_eq!(h.hidden_values()[0], 1.0);
}

#[tokio::test]
async fn test_shutdown_abandons_in_flight_fetches() {
    let mut h = harness().await;
    h.toggle();

    let mut gate = h.tick().await;
    h.driver.shutdown();
    gate.closed().await;

    let late = tokio::time::timeout(Duration::from_millis(50), h.driver.next()).await;
    assert!(late.is_err());
    assert!(h.driver.drain().is_empty());
}

#[tokio::test]
async fn test_mock_backend_streams_every_layer() {
    let backend: Arc<dyn Backend> = Arc::new(MockBackend::new(7));
    let clock = ManualClock::new();
    let mut app = netviz::open(
        &DashboardConfig::default(),
        backend.as_ref(),
        Size::new(1280.0, 720.0),
        &mut NullHost,
        &clock,
    )
    .await
    .unwrap();
    let mut driver = FetchDriver::new(backend, Handle::current());
    let view = app.active_view().unwrap();

    app.dispatch(Command::ToggleStream(view), &mut NullHost, clock.now())
        .unwrap();
    clock.advance(app.options().stream_interval);
    for request in app.poll(clock.now()) {
        driver.spawn(request);
    }
    let outcome = driver.next().await.unwrap();

    let Some(ApplyReport::Applied(report)) = app.apply(outcome, clock.now()) else {
        panic!("mock frame was not applied");
    };
    assert_eq!(report.updated.len(), 4);
    assert!(report.missing.is_empty());
    assert!(report.is_clean());
    assert_eq!(app.view(view).unwrap().canvas().cell_count(), 50 + 50 + 15 + 5);
}
