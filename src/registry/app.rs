use std::{
    collections::{BTreeMap, HashMap},
    time::Instant,
};

use log::{debug, info};

use super::{
    view::{ApplyReport, View, ViewOptions},
    Command, HostTarget, Net, NetId, ViewHost, ViewId, DEFAULT_VIEW,
};
use crate::{
    backend::NetSpec,
    error::{Result, VizError},
    geometry::Size,
    stream::{FetchOutcome, FetchRequest},
};

/// Every open net and view, and which of them is on screen.
///
/// Selection only changes through the methods below; each change is mirrored
/// to the host through `ViewHost`.
#[derive(Debug)]
pub struct AppState {
    options: ViewOptions,
    container: Size,
    // Ids grow monotonically, so this is also tab order.
    nets: BTreeMap<NetId, Net>,
    views: HashMap<ViewId, View>,
    active_net: Option<NetId>,
    next_id: u32,
}

impl AppState {
    /// Creates an empty registry.
    ///
    /// # Arguments
    /// * `options` - Settings applied to every view created later.
    /// * `container` - Initial size of the drawing area shared by all views.
    pub fn new(options: ViewOptions, container: Size) -> Self {
        Self {
            options,
            container,
            nets: BTreeMap::new(),
            views: HashMap::new(),
            active_net: None,
            next_id: 0,
        }
    }

    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn nets(&self) -> impl Iterator<Item = (NetId, &Net)> {
        self.nets.iter().map(|(&id, net)| (id, net))
    }

    pub fn net(&self, id: NetId) -> Option<&Net> {
        self.nets.get(&id)
    }

    pub fn net_by_name(&self, name: &str) -> Option<NetId> {
        self.nets
            .iter()
            .find(|(_, net)| net.name() == name)
            .map(|(&id, _)| id)
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(&id)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views.get_mut(&id)
    }

    pub fn active_net(&self) -> Option<NetId> {
        self.active_net
    }

    pub fn active_view(&self) -> Option<ViewId> {
        self.active_net
            .and_then(|id| self.nets.get(&id))
            .map(Net::active_view)
    }

    /// The net after the active one, wrapping around.
    pub fn next_net(&self) -> Option<NetId> {
        let active = self.active_net?;
        self.nets
            .range(active..)
            .nth(1)
            .or_else(|| self.nets.iter().next())
            .map(|(&id, _)| id)
    }

    fn net_ref(&self, id: NetId) -> Result<&Net> {
        self.nets
            .get(&id)
            .ok_or_else(|| VizError::UnknownNet(id.to_string()))
    }

    fn view_entry(&mut self, id: ViewId) -> Result<&mut View> {
        self.views
            .get_mut(&id)
            .ok_or_else(|| VizError::UnknownView(id.to_string()))
    }

    fn owner_of(&self, view: ViewId) -> Result<NetId> {
        self.nets
            .iter()
            .find(|(_, net)| net.contains(view))
            .map(|(&id, _)| id)
            .ok_or_else(|| VizError::UnknownView(view.to_string()))
    }

    /// Opens a net with its default view and switches to it.
    ///
    /// # Returns
    /// The new net's id, or the error that kept its default view from being built.
    /// Nothing is registered on error.
    pub fn add_net(
        &mut self,
        spec: NetSpec,
        host: &mut dyn ViewHost,
        now: Instant,
    ) -> Result<NetId> {
        if self.net_by_name(&spec.name).is_some() {
            return Err(VizError::DuplicateNetName(spec.name));
        }

        let view_id = ViewId(self.allocate());
        let view = View::new(view_id, DEFAULT_VIEW, &spec, self.container, self.options, now)?;
        let net_id = NetId(self.allocate());

        info!("opened net '{}' as {net_id}", spec.name);
        self.views.insert(view_id, view);
        self.nets.insert(net_id, Net::new(spec, view_id));

        self.switch_to_net(net_id, host)?;
        Ok(net_id)
    }

    /// Adds a named view to `net` and switches to it.
    pub fn add_view(
        &mut self,
        net: NetId,
        name: &str,
        host: &mut dyn ViewHost,
        now: Instant,
    ) -> Result<ViewId> {
        let taken = self
            .net_ref(net)?
            .views()
            .iter()
            .any(|id| self.views.get(id).is_some_and(|v| v.name() == name));
        if taken {
            return Err(VizError::DuplicateViewName(name.to_string()));
        }

        let view_id = ViewId(self.allocate());
        let spec = self.net_ref(net)?.spec();
        let view = View::new(view_id, name, spec, self.container, self.options, now)?;
        self.views.insert(view_id, view);
        if let Some(owner) = self.nets.get_mut(&net) {
            owner.views.push(view_id);
        }

        self.switch_to_view(view_id, host)?;
        Ok(view_id)
    }

    /// Makes `net` the visible one. No-op if it already is.
    ///
    /// # Returns
    /// Whether anything changed.
    pub fn switch_to_net(&mut self, net: NetId, host: &mut dyn ViewHost) -> Result<bool> {
        let active_view = self.net_ref(net)?.active_view();
        if self.active_net == Some(net) {
            return Ok(false);
        }

        if let Some(previous) = self.active_net.replace(net) {
            host.deactivate(HostTarget::Net(previous));
        }
        host.activate(HostTarget::Net(net));
        host.activate(HostTarget::View(active_view));

        debug!("switched to {net}");
        Ok(true)
    }

    /// Makes `view` the visible one, switching nets first if needed.
    ///
    /// # Returns
    /// Whether anything changed.
    pub fn switch_to_view(&mut self, view: ViewId, host: &mut dyn ViewHost) -> Result<bool> {
        let net_id = self.owner_of(view)?;
        let switched_net = self.switch_to_net(net_id, host)?;

        let Some(net) = self.nets.get_mut(&net_id) else {
            return Err(VizError::UnknownNet(net_id.to_string()));
        };
        if net.active_view == view {
            return Ok(switched_net);
        }

        let previous = std::mem::replace(&mut net.active_view, view);
        host.deactivate(HostTarget::View(previous));
        host.activate(HostTarget::View(view));

        debug!("switched to {view} of {net_id}");
        Ok(true)
    }

    /// Tears down a non-default view.
    ///
    /// Its stream stops, late responses for it are ignored and the host is told
    /// to destroy it. If it was visible, the net falls back to its default view.
    pub fn remove_view(&mut self, view: ViewId, host: &mut dyn ViewHost) -> Result<()> {
        let net_id = self.owner_of(view)?;
        let Some(net) = self.nets.get_mut(&net_id) else {
            return Err(VizError::UnknownNet(net_id.to_string()));
        };
        if net.default_view == view {
            return Err(VizError::CannotRemoveDefaultView(net.name.clone()));
        }

        net.views.retain(|&v| v != view);
        let was_active = net.active_view == view;
        if was_active {
            net.active_view = net.default_view;
        }
        let fallback = net.default_view;

        if let Some(mut removed) = self.views.remove(&view) {
            removed.teardown();
            info!("removed view '{}' of {net_id}", removed.name());
        }

        host.destroy(HostTarget::View(view));
        if was_active && self.active_net == Some(net_id) {
            host.activate(HostTarget::View(fallback));
        }
        Ok(())
    }

    /// Collects the fetches due at `now` across every view, visible or not.
    pub fn poll(&mut self, now: Instant) -> Vec<FetchRequest> {
        let mut due: Vec<FetchRequest> = self
            .views
            .values_mut()
            .filter_map(|view| view.poll(now))
            .collect();
        due.sort_by_key(|r| r.view);
        due
    }

    /// Routes a finished fetch to its view.
    ///
    /// # Returns
    /// `None` if the view was removed in the meantime.
    pub fn apply(&mut self, outcome: FetchOutcome, now: Instant) -> Option<ApplyReport> {
        let FetchOutcome { request, result } = outcome;
        let Some(view) = self.views.get_mut(&request.view) else {
            debug!("dropping response for removed {}", request.view);
            return None;
        };
        Some(view.apply(request.ticket, result, now))
    }

    /// Refits every view to a new container size.
    pub fn resize(&mut self, container: Size, now: Instant) {
        self.container = container;
        for view in self.views.values_mut() {
            view.resize(container, now);
        }
    }

    /// Executes one UI command against the view or net it names.
    pub fn dispatch(
        &mut self,
        command: Command,
        host: &mut dyn ViewHost,
        now: Instant,
    ) -> Result<()> {
        match command {
            Command::SelectNet(net) => {
                self.switch_to_net(net, host)?;
            }
            Command::SelectView(view) => {
                self.switch_to_view(view, host)?;
            }
            Command::ToggleStream(view) => {
                self.view_entry(view)?.toggle_stream(now);
            }
            Command::PointerDown(view, at) => {
                let view = self.view_entry(view)?;
                if let Some(layer) = view.canvas_mut().pointer_down(at) {
                    debug!("grabbed heatmap '{layer}'");
                }
            }
            Command::PointerMove(view, at) => self.view_entry(view)?.canvas_mut().pointer_move(at),
            Command::PointerUp(view) => self.view_entry(view)?.canvas_mut().pointer_up(),
            Command::Zoom { view, anchor, factor } => self
                .view_entry(view)?
                .canvas_mut()
                .viewport_mut()
                .zoom_at(anchor, factor),
            Command::Pan { view, dx, dy } => self
                .view_entry(view)?
                .canvas_mut()
                .viewport_mut()
                .pan(dx, dy),
            Command::ResetViewport(view) => self
                .view_entry(view)?
                .canvas_mut()
                .viewport_mut()
                .reset(),
            Command::Resize(container) => self.resize(container, now),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{example_net, LayerData},
        geometry::Point,
        stream::{Clock, ManualClock},
    };

    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<(&'static str, HostTarget)>,
    }

    impl ViewHost for RecordingHost {
        fn activate(&mut self, target: HostTarget) {
            self.calls.push(("activate", target));
        }

        fn deactivate(&mut self, target: HostTarget) {
            self.calls.push(("deactivate", target));
        }

        fn destroy(&mut self, target: HostTarget) {
            self.calls.push(("destroy", target));
        }
    }

    fn small_net(name: &str) -> NetSpec {
        let json = format!(
            r#"{{"name": "{name}", "layers": {{"hidden": {{"shape": [4, 4]}}, "output": {{"shape": [2]}}}}}}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    fn app() -> AppState {
        AppState::new(ViewOptions::default(), Size::new(800.0, 600.0))
    }

    #[test]
    fn test_new_net_activates_default_view() {
        let mut app = app();
        let mut host = RecordingHost::default();

        let net = app.add_net(small_net("a"), &mut host, Instant::now()).unwrap();
        let view = app.active_view().unwrap();

        assert_eq!(app.active_net(), Some(net));
        assert_eq!(app.view(view).unwrap().name(), DEFAULT_VIEW);
        assert_eq!(
            host.calls,
            vec![
                ("activate", HostTarget::Net(net)),
                ("activate", HostTarget::View(view)),
            ]
        );
    }

    #[test]
    fn test_switching_to_active_net_is_noop() {
        let mut app = app();
        let mut host = RecordingHost::default();
        let net = app.add_net(small_net("a"), &mut host, Instant::now()).unwrap();
        host.calls.clear();

        assert!(!app.switch_to_net(net, &mut host).unwrap());
        assert!(!app.switch_to_view(app.active_view().unwrap(), &mut host).unwrap());
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_switching_nets_reactivates_their_views() {
        let mut app = app();
        let mut host = RecordingHost::default();
        let now = Instant::now();
        let a = app.add_net(small_net("a"), &mut host, now).unwrap();
        let extra = app.add_view(a, "zoomed", &mut host, now).unwrap();
        let b = app.add_net(small_net("b"), &mut host, now).unwrap();
        host.calls.clear();

        assert!(app.switch_to_net(a, &mut host).unwrap());
        assert_eq!(app.active_view(), Some(extra));
        assert_eq!(
            host.calls,
            vec![
                ("deactivate", HostTarget::Net(b)),
                ("activate", HostTarget::Net(a)),
                ("activate", HostTarget::View(extra)),
            ]
        );
        assert_eq!(app.next_net(), Some(b));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut app = app();
        let mut host = RecordingHost::default();
        let now = Instant::now();
        let net = app.add_net(small_net("a"), &mut host, now).unwrap();

        assert!(matches!(
            app.add_net(small_net("a"), &mut host, now),
            Err(VizError::DuplicateNetName(_))
        ));
        assert!(matches!(
            app.add_view(net, DEFAULT_VIEW, &mut host, now),
            Err(VizError::DuplicateViewName(_))
        ));
        assert_eq!(app.net(net).unwrap().views().len(), 1);
    }

    #[test]
    fn test_bad_spec_aborts_net_creation() {
        let mut app = app();
        let mut host = RecordingHost::default();
        let mut spec = small_net("a");
        let duplicate = spec.layers[0].clone();
        spec.layers.push(duplicate);

        let result = app.add_net(spec, &mut host, Instant::now());

        assert!(matches!(result, Err(VizError::DuplicateLayerName(_))));
        assert_eq!(app.nets().count(), 0);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_remove_view_falls_back_to_default() {
        let mut app = app();
        let mut host = RecordingHost::default();
        let clock = ManualClock::new();
        let net = app.add_net(small_net("a"), &mut host, clock.now()).unwrap();
        let default = app.active_view().unwrap();
        let extra = app.add_view(net, "second", &mut host, clock.now()).unwrap();

        app.dispatch(Command::ToggleStream(extra), &mut host, clock.now()).unwrap();
        clock.advance(app.options().stream_interval);
        let request = app.poll(clock.now()).pop().unwrap();
        host.calls.clear();

        assert!(matches!(
            app.remove_view(default, &mut host),
            Err(VizError::CannotRemoveDefaultView(_))
        ));
        app.remove_view(extra, &mut host).unwrap();

        assert_eq!(app.active_view(), Some(default));
        assert_eq!(
            host.calls,
            vec![
                ("destroy", HostTarget::View(extra)),
                ("activate", HostTarget::View(default)),
            ]
        );

        let late = FetchOutcome {
            request,
            result: Ok([("hidden".to_string(), LayerData::Vector(vec![1.0]))].into()),
        };
        assert!(app.apply(late, clock.now()).is_none());
    }

    #[test]
    fn test_hidden_views_keep_streaming() {
        let mut app = app();
        let mut host = RecordingHost::default();
        let clock = ManualClock::new();
        let net = app.add_net(example_net(), &mut host, clock.now()).unwrap();
        let first = app.active_view().unwrap();
        app.dispatch(Command::ToggleStream(first), &mut host, clock.now()).unwrap();
        let second = app.add_view(net, "other", &mut host, clock.now()).unwrap();
        app.dispatch(Command::ToggleStream(second), &mut host, clock.now()).unwrap();

        clock.advance(app.options().stream_interval);
        let due: Vec<ViewId> = app.poll(clock.now()).into_iter().map(|r| r.view).collect();

        assert_eq!(due, vec![first, second]);
    }

    #[test]
    fn test_dispatch_routes_to_named_view() {
        let mut app = app();
        let mut host = RecordingHost::default();
        let now = Instant::now();
        let net = app.add_net(small_net("a"), &mut host, now).unwrap();
        let first = app.active_view().unwrap();
        let second = app.add_view(net, "other", &mut host, now).unwrap();

        app.dispatch(
            Command::Zoom { view: first, anchor: Point::new(0.0, 0.0), factor: 2.0 },
            &mut host,
            now,
        )
        .unwrap();

        assert_eq!(app.view(first).unwrap().canvas().viewport().scale(), 2.0);
        assert_eq!(app.view(second).unwrap().canvas().viewport().scale(), 1.0);

        let missing = ViewId(999);
        assert!(matches!(
            app.dispatch(Command::ToggleStream(missing), &mut host, now),
            Err(VizError::UnknownView(_))
        ));
    }
}
