mod drag;

use std::time::{Duration, Instant};

pub use drag::DragState;

use crate::{
    canvas::Viewport,
    error::Result,
    geometry::{Point, Rect, Size},
    grid::{ActivationGrid, LayerShape},
    scale::{value_to_color, Rgb, ScaleMapper},
    surface::Surface,
    transition::Transition,
};

/// How long a streamed update takes to fade into the new colors.
pub const UPDATE_TRANSITION: Duration = Duration::from_millis(80);
/// How long cells take to slide into place after a resize.
pub const RESIZE_TRANSITION: Duration = Duration::from_millis(10);
/// Vertical distance between the bottom of the grid and the label baseline.
pub const LABEL_OFFSET: f64 = 16.0;

/// Construction-time geometry of a heatmap's cells, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapStyle {
    pub cell_width: f64,
    pub cell_height: f64,
    pub spacing: f64,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            cell_width: 30.0,
            cell_height: 30.0,
            spacing: 2.0,
        }
    }
}

impl HeatmapStyle {
    /// The natural pixel budget of a grid drawn with this style.
    pub fn natural_size(&self, shape: LayerShape) -> Size {
        Size::new(
            (self.cell_width + self.spacing) * shape.columns() as f64,
            (self.cell_height + self.spacing) * shape.rows() as f64,
        )
    }
}

#[derive(Debug, Clone)]
struct CellVisual {
    rect: Transition<Rect>,
    fill: Transition<Rgb>,
}

/// The visual representation of one layer: a rectangle per cell plus a label.
#[derive(Debug, Clone)]
pub struct HeatmapRenderer {
    name: String,
    grid: ActivationGrid,
    style: HeatmapStyle,
    mapper: ScaleMapper,
    cells: Vec<CellVisual>,
    position: Point,
    drag: DragState,
}

impl HeatmapRenderer {
    /// Creates a new `HeatmapRenderer` with every cell at zero.
    ///
    /// Prefer `Canvas::create_heatmap`, which also enforces unique layer names.
    ///
    /// # Arguments
    /// * `shape` - The fixed shape of the layer.
    /// * `name` - The layer name, used to address streamed updates.
    /// * `position` - Initial translation inside the canvas.
    /// * `style` - Cell size and spacing.
    /// * `now` - Current time, anchors the cell transitions.
    pub fn new(
        shape: LayerShape,
        name: impl Into<String>,
        position: Point,
        style: HeatmapStyle,
        now: Instant,
    ) -> Self {
        let grid = ActivationGrid::zeros(shape);
        let mapper = ScaleMapper::new(shape, style.natural_size(shape));

        let cells = grid
            .flatten_row_major()
            .enumerate()
            .map(|(i, v)| CellVisual {
                rect: Transition::settled(cell_rect(&mapper, shape, style.spacing, i), now),
                fill: Transition::settled(value_to_color(v), now),
            })
            .collect();

        Self {
            name: name.into(),
            grid,
            style,
            mapper,
            cells,
            position,
            drag: DragState::default(),
        }
    }

    /// Recolors every cell from `grid`.
    ///
    /// Cells are neither moved nor resized.
    ///
    /// # Returns
    /// `VizError::ShapeMismatch` if `grid` does not have this heatmap's shape;
    /// nothing changes in that case.
    pub fn update(&mut self, grid: &ActivationGrid, now: Instant) -> Result<()> {
        self.grid
            .replace(grid)
            .map_err(|e| e.for_layer(&self.name))?;

        for (cell, v) in self.cells.iter_mut().zip(self.grid.flatten_row_major()) {
            cell.fill.retarget(value_to_color(v), now, UPDATE_TRANSITION);
        }

        Ok(())
    }

    /// Lays the cells out again for a new pixel budget.
    ///
    /// The mapper is rebuilt from `pixels`, never scaled from the previous one.
    pub fn resize(&mut self, pixels: Size, now: Instant) {
        let shape = self.grid.shape();
        self.mapper = ScaleMapper::new(shape, pixels);

        for (i, cell) in self.cells.iter_mut().enumerate() {
            let rect = cell_rect(&self.mapper, shape, self.style.spacing, i);
            cell.rect.retarget(rect, now, RESIZE_TRANSITION);
        }
    }

    pub fn drag_start(&mut self, pointer: Point) {
        self.drag.start(self.position, pointer);
    }

    pub fn drag_move(&mut self, pointer: Point) {
        if let Some(position) = self.drag.moved(pointer) {
            self.position = position;
        }
    }

    pub fn drag_end(&mut self) {
        self.drag.end();
    }

    /// Whether a drag is in progress.
    pub fn is_active(&self) -> bool {
        self.drag.is_active()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> LayerShape {
        self.grid.shape()
    }

    /// The most recently applied activations.
    pub fn grid(&self) -> &ActivationGrid {
        &self.grid
    }

    pub fn mapper(&self) -> &ScaleMapper {
        &self.mapper
    }

    pub fn style(&self) -> HeatmapStyle {
        self.style
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The color cell `index` is fading towards.
    pub fn cell_color(&self, index: usize) -> Option<Rgb> {
        self.cells.get(index).map(|c| c.fill.target())
    }

    /// The color cell `index` shows at `now`.
    pub fn cell_color_at(&self, index: usize, now: Instant) -> Option<Rgb> {
        self.cells.get(index).map(|c| c.fill.value_at(now))
    }

    /// The local rectangle of cell `index` at `now`.
    pub fn cell_rect_at(&self, index: usize, now: Instant) -> Option<Rect> {
        self.cells.get(index).map(|c| c.rect.value_at(now))
    }

    /// Label anchor relative to the heatmap's own origin: centered below the grid.
    pub fn label_anchor(&self) -> Point {
        let pixels = self.mapper.pixels();
        Point::new(pixels.width / 2.0, pixels.height + LABEL_OFFSET)
    }

    /// The grid's footprint in canvas coordinates.
    pub fn bounds(&self) -> Rect {
        let pixels = self.mapper.pixels();
        Rect::new(self.position.x, self.position.y, pixels.width, pixels.height)
    }

    pub fn paint(&self, surface: &mut dyn Surface, viewport: &Viewport, now: Instant) {
        for cell in &self.cells {
            let rect = cell.rect.value_at(now).translate(self.position);
            surface.fill_rect(viewport.rect_to_screen(rect), cell.fill.value_at(now));
        }

        let anchor = self.label_anchor();
        let anchor = self.position.offset(anchor.x, anchor.y);
        surface.draw_label(viewport.to_screen(anchor), &self.name, self.is_active());
    }
}

fn cell_rect(mapper: &ScaleMapper, shape: LayerShape, spacing: f64, index: usize) -> Rect {
    let (row, column) = shape.coords(index);
    Rect::new(
        mapper.column_to_x(column as f64),
        mapper.row_to_y(row as f64),
        (mapper.cell_width() - spacing).max(0.0),
        (mapper.cell_height() - spacing).max(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::VizError, surface::RecordingSurface};

    fn renderer(rows: usize, columns: usize, now: Instant) -> HeatmapRenderer {
        let shape = LayerShape::new(rows, columns).unwrap();
        HeatmapRenderer::new(shape, "hidden", Point::default(), HeatmapStyle::default(), now)
    }

    #[test]
    fn test_create_allocates_one_zero_cell_per_entry() {
        let now = Instant::now();
        let map = renderer(4, 3, now);

        assert_eq!(map.cell_count(), 12);
        for i in 0..12 {
            assert_eq!(map.cell_color(i), Some(value_to_color(0.0)));
        }
    }

    #[test]
    fn test_create_places_cells_and_label() {
        let now = Instant::now();
        let map = renderer(2, 3, now);

        // (30 + 2) px per cell
        assert_eq!(map.cell_rect_at(0, now), Some(Rect::new(0.0, 0.0, 30.0, 30.0)));
        assert_eq!(map.cell_rect_at(4, now), Some(Rect::new(32.0, 32.0, 30.0, 30.0)));
        assert_eq!(map.label_anchor(), Point::new(48.0, 80.0));
    }

    #[test]
    fn test_update_fades_into_new_colors() {
        let t0 = Instant::now();
        let mut map = renderer(1, 2, t0);
        let grid = ActivationGrid::from_rows(vec![vec![1.0, 0.5]]).unwrap();

        map.update(&grid, t0).unwrap();

        assert_eq!(map.cell_color_at(0, t0), Some(value_to_color(0.0)));
        let done = t0 + UPDATE_TRANSITION;
        assert_eq!(map.cell_color_at(0, done), Some(value_to_color(1.0)));
        assert_eq!(map.cell_color_at(1, done), Some(value_to_color(0.5)));
        assert_eq!(map.cell_rect_at(1, done), map.cell_rect_at(1, t0));
    }

    #[test]
    fn test_update_with_wrong_shape_is_rejected() {
        let now = Instant::now();
        let mut map = renderer(2, 2, now);
        let grid = ActivationGrid::from_rows(vec![vec![1.0, 1.0, 1.0]]).unwrap();

        let err = map.update(&grid, now).unwrap_err();

        assert!(matches!(
            err,
            VizError::ShapeMismatch { layer: Some(ref l), .. } if l == "hidden"
        ));
        assert!(map.grid().flatten_row_major().all(|v| v == 0.0));
        assert_eq!(map.cell_color(0), Some(value_to_color(0.0)));
    }

    #[test]
    fn test_resize_rebuilds_mapper_for_new_budget() {
        let t0 = Instant::now();
        let mut map = renderer(4, 4, t0);

        map.resize(Size::new(400.0, 400.0), t0);
        map.resize(Size::new(800.0, 200.0), t0);

        assert_eq!(map.mapper().column_to_x(4.0), 800.0);
        assert_eq!(map.mapper().row_to_y(4.0), 200.0);
        assert_eq!(map.cell_count(), 16);

        let done = t0 + RESIZE_TRANSITION;
        assert_eq!(map.cell_rect_at(5, done), Some(Rect::new(200.0, 50.0, 198.0, 48.0)));
    }

    #[test]
    fn test_drag_moves_relative_to_press_point() {
        let now = Instant::now();
        let shape = LayerShape::new(1, 1).unwrap();
        let mut map = HeatmapRenderer::new(
            shape,
            "out",
            Point::new(100.0, 50.0),
            HeatmapStyle::default(),
            now,
        );

        map.drag_start(Point::new(110.0, 60.0));
        assert!(map.is_active());

        map.drag_move(Point::new(130.0, 40.0));
        assert_eq!(map.position(), Point::new(120.0, 30.0));

        map.drag_end();
        assert!(!map.is_active());
        map.drag_move(Point::new(0.0, 0.0));
        assert_eq!(map.position(), Point::new(120.0, 30.0));
    }

    #[test]
    fn test_paint_emits_cells_then_label() {
        let now = Instant::now();
        let map = renderer(2, 2, now);
        let mut surface = RecordingSurface::new(Size::new(640.0, 480.0));

        map.paint(&mut surface, &Viewport::default(), now);

        assert_eq!(surface.fills().count(), 4);
        assert_eq!(surface.labels().collect::<Vec<_>>(), vec!["hidden"]);
    }
}
