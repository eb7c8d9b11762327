use std::time::{Duration, Instant};

use netviz::{
    geometry::{Point, Size},
    registry::{ApplyReport, NetId, View, ViewId},
    stream::{Clock, FetchDriver, SystemClock},
    AppState, Command, HostTarget,
};

use super::{
    host::TabHost,
    model::{Action, Level, LogLine},
};

const MAX_LOGS: usize = 200;

/// Everything the terminal shows, driven once per frame.
pub struct DashboardState {
    app: AppState,
    host: TabHost,
    driver: FetchDriver,
    clock: SystemClock,
    started_at: Instant,
    frames: usize,
    logs: Vec<LogLine>,
}

impl DashboardState {
    /// Creates a new `DashboardState`.
    ///
    /// # Args
    /// * `app` - The registry, already holding the start-up net.
    /// * `host` - The host the registry was opened with.
    /// * `driver` - Runs fetches for every streaming view.
    pub fn new(app: AppState, host: TabHost, driver: FetchDriver) -> Self {
        let mut state = Self {
            app,
            host,
            driver,
            clock: SystemClock,
            started_at: Instant::now(),
            frames: 0,
            logs: Vec::new(),
        };

        if let Some(net) = state.app.active_net().and_then(|id| state.app.net(id)) {
            let message = format!(
                "opened {} with {} layer(s), press s to stream",
                net.name(),
                net.spec().layers.len()
            );
            state.push_log(Level::Info, message);
        }
        state
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    pub fn logs(&self) -> &[LogLine] {
        &self.logs
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// The view to draw, if the host is showing one.
    pub fn visible_view(&self) -> Option<&View> {
        let net = self.app.active_net()?;
        let view = self.app.active_view()?;
        let shown = self.host.is_shown(HostTarget::Net(net))
            && self.host.is_shown(HostTarget::View(view));
        shown.then(|| self.app.view(view)).flatten()
    }

    /// Issues due fetches and applies every finished one. Non-blocking.
    ///
    /// Should be called once per TUI frame tick.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        for request in self.app.poll(now) {
            self.driver.spawn(request);
        }

        for outcome in self.driver.drain() {
            let view = outcome.request.view;
            match self.app.apply(outcome, now) {
                Some(ApplyReport::Applied(report)) => {
                    self.frames += 1;
                    for warning in report.unknown {
                        self.push_log(Level::Warn, format!("{view}: {warning}"));
                    }
                    for error in report.rejected {
                        self.push_log(Level::Warn, format!("{view}: {error}"));
                    }
                }
                Some(ApplyReport::Failed(e)) => {
                    self.push_log(Level::Error, format!("{view}: {e}"));
                }
                Some(ApplyReport::Dropped(_)) | None => {}
            }
        }
    }

    /// Refits every view to a new canvas size.
    pub fn resize(&mut self, container: Size) {
        self.run(Command::Resize(container));
    }

    /// Applies one user action to the active view.
    ///
    /// # Returns
    /// `false` once the user asked to quit.
    pub fn handle(&mut self, action: Action) -> bool {
        let Some(view) = self.app.active_view() else {
            return !matches!(action, Action::Quit);
        };

        match action {
            Action::None => {}
            Action::Quit => return false,
            Action::ToggleStream => {
                self.run(Command::ToggleStream(view));
                if let Some(v) = self.app.view(view) {
                    let message = format!("{}: {:?}", v.name(), v.stream().state());
                    self.push_log(Level::Info, message);
                }
            }
            Action::NextNet => {
                if let Some(net) = self.app.next_net() {
                    self.run(Command::SelectNet(net));
                }
            }
            Action::NextView => {
                if let Some(next) = self.active_net_next_view() {
                    self.run(Command::SelectView(next));
                }
            }
            Action::AddView => self.add_view(),
            Action::CloseView => self.close_view(view),
            Action::Zoom { anchor, factor } => {
                let container = self.app.container();
                let anchor = anchor
                    .unwrap_or_else(|| Point::new(container.width / 2.0, container.height / 2.0));
                self.run(Command::Zoom { view, anchor, factor });
            }
            Action::Pan { dx, dy } => self.run(Command::Pan { view, dx, dy }),
            Action::ResetViewport => self.run(Command::ResetViewport(view)),
            Action::Fit => self.resize(self.app.container()),
            Action::PointerDown(at) => self.run(Command::PointerDown(view, at)),
            Action::PointerMove(at) => self.run(Command::PointerMove(view, at)),
            Action::PointerUp => self.run(Command::PointerUp(view)),
        }
        true
    }

    /// Abandons in-flight fetches.
    pub fn shutdown(&self) {
        self.driver.shutdown();
    }

    fn active_net_next_view(&self) -> Option<ViewId> {
        let net = self.app.active_net()?;
        self.app.net(net).map(|n| n.next_view())
    }

    fn add_view(&mut self) {
        let Some(net) = self.app.active_net() else {
            return;
        };
        let name = self.free_view_name(net);
        let now = self.clock.now();

        match self.app.add_view(net, &name, &mut self.host, now) {
            Ok(_) => self.push_log(Level::Info, format!("added {name}")),
            Err(e) => self.push_log(Level::Error, e.to_string()),
        }
    }

    /// The first `viewN` (N >= 2) not used by any view of `net`.
    fn free_view_name(&self, net: NetId) -> String {
        let taken: Vec<&str> = self
            .app
            .net(net)
            .into_iter()
            .flat_map(|n| n.views().iter())
            .filter_map(|&id| self.app.view(id).map(View::name))
            .collect();

        (2..)
            .map(|n| format!("view{n}"))
            .find(|name| !taken.contains(&name.as_str()))
            .unwrap_or_default()
    }

    fn close_view(&mut self, view: ViewId) {
        let name = self.app.view(view).map(|v| v.name().to_string());
        match self.app.remove_view(view, &mut self.host) {
            Ok(()) => self.push_log(Level::Info, format!("closed {}", name.unwrap_or_default())),
            Err(e) => self.push_log(Level::Warn, e.to_string()),
        }
    }

    fn run(&mut self, command: Command) {
        let now = self.clock.now();
        if let Err(e) = self.app.dispatch(command, &mut self.host, now) {
            self.push_log(Level::Error, e.to_string());
        }
    }

    fn push_log(&mut self, level: Level, message: String) {
        self.logs.push(LogLine { level, message });
        if self.logs.len() > MAX_LOGS {
            let drain = self.logs.len() - MAX_LOGS;
            self.logs.drain(0..drain);
        }
    }
}
