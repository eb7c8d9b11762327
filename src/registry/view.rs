use std::{
    fmt,
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use super::ViewId;
use crate::{
    backend::{ActivityFrame, NetSpec},
    canvas::Canvas,
    error::{FetchError, Result, VizError},
    geometry::{Point, Size},
    heatmap::{HeatmapStyle, LABEL_OFFSET},
    stream::{
        FetchRequest, FetchTicket, StreamController, StreamState, TicketStatus,
        DEFAULT_STREAM_INTERVAL,
    },
    surface::Surface,
};

/// Construction-time settings shared by every view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    pub style: HeatmapStyle,
    /// Horizontal gap between neighbouring heatmaps.
    pub layer_gap: f64,
    pub stream_interval: Duration,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            style: HeatmapStyle::default(),
            layer_gap: 16.0,
            stream_interval: DEFAULT_STREAM_INTERVAL,
        }
    }
}

/// Streamed data named a layer this view does not draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLayerWarning {
    pub layer: String,
}

impl fmt::Display for UnknownLayerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer '{}' is not part of this view", self.layer)
    }
}

/// What a successfully fetched frame did to a view.
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Layers that were recolored.
    pub updated: Vec<String>,
    /// Known layers the frame left out. Not a problem, they keep their colors.
    pub missing: Vec<String>,
    pub unknown: Vec<UnknownLayerWarning>,
    /// Layers whose data was rejected (bad shape or ragged rows).
    pub rejected: Vec<VizError>,
}

impl FrameReport {
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.rejected.is_empty()
    }
}

/// The fate of one fetch outcome.
#[derive(Debug)]
pub enum ApplyReport {
    Applied(FrameReport),
    /// The response arrived after a stop or behind a newer one.
    Dropped(TicketStatus),
    /// The fetch itself failed; the previous frame stays on screen.
    Failed(FetchError),
}

/// A named arrangement of one heatmap per layer, with its own stream.
#[derive(Debug)]
pub struct View {
    id: ViewId,
    name: String,
    net: String,
    canvas: Canvas,
    stream: StreamController,
    options: ViewOptions,
    container: Size,
}

impl View {
    /// Builds a view with a heatmap for every layer of `spec`.
    ///
    /// Heatmaps are laid out left to right in spec order and vertically
    /// centered in `container`.
    ///
    /// # Returns
    /// The view, or the first error that prevented a heatmap from being created.
    pub fn new(
        id: ViewId,
        name: impl Into<String>,
        spec: &NetSpec,
        container: Size,
        options: ViewOptions,
        now: Instant,
    ) -> Result<Self> {
        let name = name.into();
        let style = options.style;
        let pitch_x = style.cell_width + style.spacing;
        let pitch_y = style.cell_height + style.spacing;

        let mut canvas = Canvas::new();
        let mut left = 0.0;
        for layer in &spec.layers {
            let shape = layer.shape;
            let top = container.height / 2.0 - shape.rows() as f64 * pitch_y / 2.0 - pitch_y;
            canvas.create_heatmap(shape, &layer.name, Point::new(left, top), style, now)?;
            left += pitch_x * shape.columns() as f64 + options.layer_gap;
        }

        info!(
            "view '{name}' of net '{}' ready: {} layer(s), {} cell(s)",
            spec.name,
            canvas.len(),
            canvas.cell_count()
        );

        Ok(Self {
            id,
            name,
            net: spec.name.clone(),
            canvas,
            stream: StreamController::new(options.stream_interval),
            options,
            container,
        })
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn net(&self) -> &str {
        &self.net
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn stream(&self) -> &StreamController {
        &self.stream
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn toggle_stream(&mut self, now: Instant) -> StreamState {
        let state = self.stream.toggle(now);
        info!("view '{}': {:?}", self.name, state);
        state
    }

    /// The stream control label for this view.
    pub fn stream_label(&self) -> &'static str {
        self.stream.label()
    }

    /// Returns the fetch this view wants issued at `now`, if a tick is due.
    pub fn poll(&mut self, now: Instant) -> Option<FetchRequest> {
        self.stream.poll(now).map(|ticket| FetchRequest {
            view: self.id,
            net: self.net.clone(),
            ticket,
        })
    }

    /// Applies a fetch outcome, unless streaming stopped since it was issued.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        result: std::result::Result<ActivityFrame, FetchError>,
        now: Instant,
    ) -> ApplyReport {
        if !self.stream.is_current(ticket) {
            debug!("view '{}': dropping response #{} after stop", self.name, ticket.seq());
            return ApplyReport::Dropped(TicketStatus::Stopped);
        }

        let frame = match result {
            Ok(frame) => frame,
            Err(e) => {
                warn!("view '{}': fetch failed, keeping previous frame: {e}", self.name);
                return ApplyReport::Failed(e);
            }
        };

        match self.stream.admit(ticket) {
            TicketStatus::Live => ApplyReport::Applied(self.apply_frame(frame, now)),
            status => {
                debug!("view '{}': dropping response #{} ({status:?})", self.name, ticket.seq());
                ApplyReport::Dropped(status)
            }
        }
    }

    /// Dispatches every layer of `frame` to its heatmap.
    ///
    /// Problems with one layer never affect the others.
    pub fn apply_frame(&mut self, frame: ActivityFrame, now: Instant) -> FrameReport {
        let missing: Vec<String> = self
            .canvas
            .heatmaps()
            .map(|h| h.name())
            .filter(|name| !frame.contains_key(*name))
            .map(str::to_string)
            .collect();
        let mut report = FrameReport {
            missing,
            ..FrameReport::default()
        };
        if !report.missing.is_empty() {
            debug!("view '{}': frame omits {:?}", self.name, report.missing);
        }

        for (layer, data) in frame {
            let Some(heatmap) = self.canvas.get_mut(&layer) else {
                let warning = UnknownLayerWarning { layer };
                warn!("view '{}': {warning}", self.name);
                report.unknown.push(warning);
                continue;
            };

            match data.into_grid().and_then(|grid| heatmap.update(&grid, now)) {
                Ok(()) => report.updated.push(layer),
                Err(e) => {
                    let e = e.for_layer(&layer);
                    warn!("view '{}': {e}", self.name);
                    report.rejected.push(e);
                }
            }
        }

        report
    }

    /// Refits every heatmap to a new container size.
    ///
    /// All layers are scaled by one factor so they fit side by side, with room
    /// for their labels, then laid out again from the left edge. Positions set
    /// by dragging are reset.
    pub fn resize(&mut self, container: Size, now: Instant) {
        self.container = container;
        if container.width <= 0.0 || container.height <= 0.0 || self.canvas.is_empty() {
            return;
        }

        let style = self.options.style;
        let naturals: Vec<Size> = self
            .canvas
            .heatmaps()
            .map(|h| style.natural_size(h.shape()))
            .collect();

        let gaps = self.options.layer_gap * (naturals.len() - 1) as f64;
        let total_width: f64 = naturals.iter().map(|s| s.width).sum::<f64>() + gaps;
        let max_height = naturals.iter().map(|s| s.height).fold(0.0, f64::max);
        let usable_height = (container.height - 2.0 * LABEL_OFFSET).max(1.0);
        let factor = (container.width / total_width).min(usable_height / max_height);

        let mut left = 0.0;
        for (heatmap, natural) in self.canvas.heatmaps_mut().zip(naturals) {
            let budget = Size::new(natural.width * factor, natural.height * factor);
            heatmap.resize(budget, now);

            let top = (container.height - LABEL_OFFSET) / 2.0 - budget.height / 2.0;
            heatmap.set_position(Point::new(left, top));
            left += budget.width + self.options.layer_gap * factor;
        }

        debug!("view '{}' refit to {container:?} (x{factor:.3})", self.name);
    }

    /// Stops streaming for good. Called when the view is removed.
    pub fn teardown(&mut self) {
        if self.stream.stop() {
            info!("view '{}': stream stopped on teardown", self.name);
        }
    }

    pub fn paint(&self, surface: &mut dyn Surface, now: Instant) {
        self.canvas.paint(surface, now);
    }
}
