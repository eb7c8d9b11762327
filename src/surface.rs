use crate::{
    geometry::{Point, Rect, Size},
    scale::Rgb,
};

/// A mountable drawing target provided by the host UI.
///
/// Coordinates are in surface pixels, already transformed by the canvas viewport.
pub trait Surface {
    /// The current pixel dimensions of the surface.
    fn size(&self) -> Size;

    /// Paints a filled rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    /// Writes `text` horizontally centered on `anchor`.
    ///
    /// `active` is set while the owning heatmap is being dragged.
    fn draw_label(&mut self, anchor: Point, text: &str, active: bool);
}

/// What a `RecordingSurface` saw, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Fill(Rect, Rgb),
    Label(Point, String, bool),
}

/// A surface that just records paint calls. Handy for headless hosts and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub size: Size,
    pub ops: Vec<PaintOp>,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn fills(&self) -> impl Iterator<Item = (&Rect, &Rgb)> {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Fill(rect, color) => Some((rect, color)),
            PaintOp::Label(..) => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            PaintOp::Label(_, text, _) => Some(text.as_str()),
            PaintOp::Fill(..) => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ops.push(PaintOp::Fill(rect, color));
    }

    fn draw_label(&mut self, anchor: Point, text: &str, active: bool) {
        self.ops.push(PaintOp::Label(anchor, text.to_string(), active));
    }
}
