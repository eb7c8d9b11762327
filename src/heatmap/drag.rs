use crate::geometry::Point;

/// Tracks one press-drag-release gesture on a heatmap.
///
/// Motion is relative: the offset between the heatmap's translation and the
/// pointer is captured on press and re-applied to every later pointer position.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragState {
    anchor: Option<Point>,
}

impl DragState {
    /// Begins a drag.
    ///
    /// # Arguments
    /// * `position` - The heatmap's current translation.
    /// * `pointer` - Where the press happened, in canvas coordinates.
    pub fn start(&mut self, position: Point, pointer: Point) {
        self.anchor = Some(Point::new(position.x - pointer.x, position.y - pointer.y));
    }

    /// Returns the new translation for `pointer`, or `None` when no drag is running.
    pub fn moved(&self, pointer: Point) -> Option<Point> {
        self.anchor
            .map(|anchor| Point::new(anchor.x + pointer.x, anchor.y + pointer.y))
    }

    pub fn end(&mut self) {
        self.anchor = None;
    }

    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }
}
