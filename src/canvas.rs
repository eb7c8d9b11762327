use std::{collections::HashMap, time::Instant};

use log::debug;

use crate::{
    error::{Result, VizError},
    geometry::{Point, Rect},
    grid::LayerShape,
    heatmap::{HeatmapRenderer, HeatmapStyle},
    surface::Surface,
};

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 5.0;

/// Pan/zoom transform applied to the whole canvas: `screen = canvas * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f64,
    translate: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Point::default(),
        }
    }
}

impl Viewport {
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> Point {
        self.translate
    }

    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate.x,
            p.y * self.scale + self.translate.y,
        )
    }

    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.translate.x) / self.scale,
            (p.y - self.translate.y) / self.scale,
        )
    }

    pub fn rect_to_screen(&self, r: Rect) -> Rect {
        let origin = self.to_screen(Point::new(r.x, r.y));
        Rect::new(origin.x, origin.y, r.width * self.scale, r.height * self.scale)
    }

    /// Multiplies the zoom by `factor`, keeping the canvas point under `anchor` fixed.
    ///
    /// The resulting scale is clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let pinned = self.to_canvas(anchor);
        self.scale = (self.scale * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.translate = Point::new(
            anchor.x - pinned.x * self.scale,
            anchor.y - pinned.y * self.scale,
        );
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.translate = self.translate.offset(dx, dy);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Drag(usize),
    Pan(Point),
}

/// The scene graph of one view: its heatmaps, their stacking order and the viewport.
#[derive(Debug, Default)]
pub struct Canvas {
    heatmaps: Vec<HeatmapRenderer>,
    by_name: HashMap<String, usize>,
    // Indices into `heatmaps`, bottom first.
    z_order: Vec<usize>,
    viewport: Viewport,
    gesture: Option<Gesture>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a heatmap for a layer and mounts it on top of the canvas.
    ///
    /// # Arguments
    /// * `shape` - The fixed shape of the layer.
    /// * `name` - The layer name, unique within this canvas.
    /// * `position` - Initial translation.
    /// * `style` - Cell size and spacing.
    /// * `now` - Current time.
    ///
    /// # Returns
    /// The new heatmap or `VizError::DuplicateLayerName` if `name` is taken.
    pub fn create_heatmap(
        &mut self,
        shape: LayerShape,
        name: &str,
        position: Point,
        style: HeatmapStyle,
        now: Instant,
    ) -> Result<&mut HeatmapRenderer> {
        if self.by_name.contains_key(name) {
            return Err(VizError::DuplicateLayerName(name.to_string()));
        }

        let idx = self.heatmaps.len();
        self.heatmaps
            .push(HeatmapRenderer::new(shape, name, position, style, now));
        self.by_name.insert(name.to_string(), idx);
        self.z_order.push(idx);

        debug!("created heatmap '{name}' ({shape})");
        Ok(&mut self.heatmaps[idx])
    }

    pub fn get(&self, name: &str) -> Option<&HeatmapRenderer> {
        self.by_name.get(name).map(|&i| &self.heatmaps[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut HeatmapRenderer> {
        self.by_name.get(name).map(|&i| &mut self.heatmaps[i])
    }

    /// Heatmaps in creation (left to right) order.
    pub fn heatmaps(&self) -> impl Iterator<Item = &HeatmapRenderer> {
        self.heatmaps.iter()
    }

    pub fn heatmaps_mut(&mut self) -> impl Iterator<Item = &mut HeatmapRenderer> {
        self.heatmaps.iter_mut()
    }

    /// Layer names bottom to top.
    pub fn stacking(&self) -> impl Iterator<Item = &str> {
        self.z_order.iter().map(|&i| self.heatmaps[i].name())
    }

    pub fn len(&self) -> usize {
        self.heatmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heatmaps.is_empty()
    }

    /// Total number of cells over every heatmap.
    pub fn cell_count(&self) -> usize {
        self.heatmaps.iter().map(HeatmapRenderer::cell_count).sum()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// The topmost heatmap whose grid contains `p` (canvas coordinates).
    fn heatmap_at(&self, p: Point) -> Option<usize> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|&i| self.heatmaps[i].bounds().contains(p))
    }

    fn raise(&mut self, idx: usize) {
        self.z_order.retain(|&i| i != idx);
        self.z_order.push(idx);
    }

    /// Handles a pointer press at `screen`.
    ///
    /// A press on a heatmap starts dragging it and raises it above its siblings;
    /// anywhere else starts panning the canvas.
    ///
    /// # Returns
    /// The name of the grabbed heatmap, if any.
    pub fn pointer_down(&mut self, screen: Point) -> Option<&str> {
        // A release can be lost outside the terminal window.
        self.pointer_up();
        let p = self.viewport.to_canvas(screen);

        match self.heatmap_at(p) {
            Some(idx) => {
                self.raise(idx);
                self.heatmaps[idx].drag_start(p);
                self.gesture = Some(Gesture::Drag(idx));
                Some(self.heatmaps[idx].name())
            }
            None => {
                self.gesture = Some(Gesture::Pan(screen));
                None
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Point) {
        match self.gesture {
            Some(Gesture::Drag(idx)) => {
                let p = self.viewport.to_canvas(screen);
                self.heatmaps[idx].drag_move(p);
            }
            Some(Gesture::Pan(last)) => {
                self.viewport.pan(screen.x - last.x, screen.y - last.y);
                self.gesture = Some(Gesture::Pan(screen));
            }
            None => {}
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(Gesture::Drag(idx)) = self.gesture.take() {
            self.heatmaps[idx].drag_end();
        }
    }

    /// Paints every heatmap bottom to top.
    pub fn paint(&self, surface: &mut dyn Surface, now: Instant) {
        for &i in &self.z_order {
            self.heatmaps[i].paint(surface, &self.viewport, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::Size,
        grid::ActivationGrid,
        scale::value_to_color,
        surface::RecordingSurface,
    };

    fn canvas_with(layers: &[(&str, usize, usize, f64)], now: Instant) -> Canvas {
        let mut canvas = Canvas::new();
        for &(name, rows, columns, x) in layers {
            let shape = LayerShape::new(rows, columns).unwrap();
            canvas
                .create_heatmap(shape, name, Point::new(x, 0.0), HeatmapStyle::default(), now)
                .unwrap();
        }
        canvas
    }

    #[test]
    fn test_duplicate_layer_names_are_rejected() {
        let now = Instant::now();
        let mut canvas = canvas_with(&[("hidden", 2, 2, 0.0)], now);
        let shape = LayerShape::new(1, 1).unwrap();

        let err = canvas
            .create_heatmap(shape, "hidden", Point::default(), HeatmapStyle::default(), now)
            .unwrap_err();

        assert!(matches!(err, VizError::DuplicateLayerName(ref n) if n == "hidden"));
        assert_eq!(canvas.len(), 1);
    }

    #[test]
    fn test_drag_raises_and_moves_heatmap() {
        let now = Instant::now();
        let mut canvas = canvas_with(&[("a", 2, 2, 0.0), ("b", 2, 2, 100.0)], now);

        let grabbed = canvas.pointer_down(Point::new(10.0, 10.0)).map(str::to_string);
        assert_eq!(grabbed.as_deref(), Some("a"));
        assert_eq!(canvas.stacking().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(canvas.get("a").unwrap().is_active());

        canvas.pointer_move(Point::new(60.0, 30.0));
        canvas.pointer_up();

        let a = canvas.get("a").unwrap();
        assert_eq!(a.position(), Point::new(50.0, 20.0));
        assert!(!a.is_active());
        assert_eq!(canvas.get("b").unwrap().position(), Point::new(100.0, 0.0));
    }

    #[test]
    fn test_new_press_ends_unreleased_drag() {
        let now = Instant::now();
        let mut canvas = canvas_with(&[("a", 2, 2, 0.0), ("b", 2, 2, 100.0)], now);

        canvas.pointer_down(Point::new(10.0, 10.0));
        canvas.pointer_down(Point::new(110.0, 10.0));
        assert!(!canvas.get("a").unwrap().is_active());
        assert!(canvas.get("b").unwrap().is_active());

        canvas.pointer_up();
        assert!(!canvas.get("a").unwrap().is_active());
        assert!(!canvas.get("b").unwrap().is_active());
    }

    #[test]
    fn test_update_mid_drag_keeps_position_and_colors() {
        let now = Instant::now();
        let mut canvas = canvas_with(&[("a", 2, 2, 0.0)], now);

        canvas.pointer_down(Point::new(10.0, 10.0));
        canvas.pointer_move(Point::new(40.0, 30.0));

        let grid = ActivationGrid::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        canvas.get_mut("a").unwrap().update(&grid, now).unwrap();
        assert_eq!(canvas.get("a").unwrap().position(), Point::new(30.0, 20.0));

        canvas.pointer_move(Point::new(50.0, 50.0));
        canvas.pointer_up();

        let a = canvas.get("a").unwrap();
        assert_eq!(a.position(), Point::new(40.0, 40.0));
        assert!(!a.is_active());
        assert_eq!(
            a.grid().flatten_row_major().collect::<Vec<_>>(),
            vec![1.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(a.cell_color(0), Some(value_to_color(1.0)));
        assert_eq!(a.cell_color(1), Some(value_to_color(0.0)));
    }

    #[test]
    fn test_press_on_empty_space_pans() {
        let now = Instant::now();
        let mut canvas = canvas_with(&[("a", 1, 1, 0.0)], now);

        assert!(canvas.pointer_down(Point::new(500.0, 500.0)).is_none());
        canvas.pointer_move(Point::new(520.0, 490.0));
        canvas.pointer_up();

        assert_eq!(canvas.viewport().translate(), Point::new(20.0, -10.0));
        assert_eq!(canvas.get("a").unwrap().position(), Point::default());
    }

    #[test]
    fn test_zoom_is_clamped_and_anchored() {
        let mut viewport = Viewport::default();
        let anchor = Point::new(100.0, 100.0);

        viewport.zoom_at(anchor, 2.0);
        assert_eq!(viewport.scale(), 2.0);
        assert_eq!(viewport.to_screen(Point::new(100.0, 100.0)), anchor);

        viewport.zoom_at(anchor, 100.0);
        assert_eq!(viewport.scale(), MAX_ZOOM);
        viewport.zoom_at(anchor, 0.0001);
        assert_eq!(viewport.scale(), MIN_ZOOM);
    }

    #[test]
    fn test_drag_works_under_zoom() {
        let now = Instant::now();
        let mut canvas = canvas_with(&[("a", 1, 1, 0.0)], now);
        canvas.viewport_mut().zoom_at(Point::default(), 2.0);

        canvas.pointer_down(Point::new(20.0, 20.0));
        canvas.pointer_move(Point::new(40.0, 60.0));
        canvas.pointer_up();

        assert_eq!(canvas.get("a").unwrap().position(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_paint_follows_stacking_order() {
        let now = Instant::now();
        let mut canvas = canvas_with(&[("a", 1, 1, 0.0), ("b", 1, 1, 100.0)], now);
        canvas.pointer_down(Point::new(5.0, 5.0));
        canvas.pointer_up();

        let mut surface = RecordingSurface::new(Size::new(300.0, 300.0));
        canvas.paint(&mut surface, now);

        assert_eq!(surface.labels().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(canvas.cell_count(), 2);
    }
}
