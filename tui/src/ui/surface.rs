use netviz::{
    geometry::{Point, Rect as PxRect, Size},
    scale::Rgb,
    surface::Surface,
};
use ratatui::{buffer::Buffer, layout::Rect, style::Color};

use super::theme::Theme;

/// Horizontal pixels covered by one terminal column.
pub const PX_PER_COLUMN: f64 = 8.0;
/// Vertical pixels covered by one terminal row.
pub const PX_PER_ROW: f64 = 16.0;

/// The pixel size of a terminal area.
pub fn area_to_pixels(area: Rect) -> Size {
    Size::new(
        f64::from(area.width) * PX_PER_COLUMN,
        f64::from(area.height) * PX_PER_ROW,
    )
}

/// The pixel position of the center of a terminal cell, relative to `area`.
pub fn cell_to_pixels(area: Rect, column: u16, row: u16) -> Point {
    Point::new(
        (f64::from(column) - f64::from(area.x) + 0.5) * PX_PER_COLUMN,
        (f64::from(row) - f64::from(area.y) + 0.5) * PX_PER_ROW,
    )
}

// Cells whose centers fall in [from, to) along one axis, clipped to [0, limit).
fn covered(from: f64, to: f64, step: f64, limit: u16) -> std::ops::Range<u16> {
    let clip = |v: f64| v.ceil().clamp(0.0, f64::from(limit)) as u16;
    clip(from / step - 0.5)..clip(to / step - 0.5)
}

/// Paints heatmaps into a region of a ratatui buffer.
pub struct BufferSurface<'a> {
    buf: &'a mut Buffer,
    area: Rect,
}

impl<'a> BufferSurface<'a> {
    pub fn new(buf: &'a mut Buffer, area: Rect) -> Self {
        Self { buf, area }
    }
}

impl Surface for BufferSurface<'_> {
    fn size(&self) -> Size {
        area_to_pixels(self.area)
    }

    fn fill_rect(&mut self, rect: PxRect, color: Rgb) {
        let Rgb(r, g, b) = color;
        let columns = covered(rect.x, rect.x + rect.width, PX_PER_COLUMN, self.area.width);
        let rows = covered(rect.y, rect.y + rect.height, PX_PER_ROW, self.area.height);

        for row in rows {
            for column in columns.clone() {
                self.buf
                    .get_mut(self.area.x + column, self.area.y + row)
                    .set_bg(Color::Rgb(r, g, b));
            }
        }
    }

    fn draw_label(&mut self, anchor: Point, text: &str, active: bool) {
        let row = (anchor.y / PX_PER_ROW).floor();
        if row < 0.0 || row >= f64::from(self.area.height) {
            return;
        }

        let width = text.chars().count() as f64;
        let start = (anchor.x / PX_PER_COLUMN - width / 2.0).floor();
        let skip = (-start).max(0.0) as usize;
        let column = start.max(0.0) as u16;
        if column >= self.area.width {
            return;
        }

        let visible: String = text.chars().skip(skip).collect();
        let style = if active { Theme::label_active() } else { Theme::label() };
        self.buf.set_stringn(
            self.area.x + column,
            self.area.y + row as u16,
            visible,
            usize::from(self.area.width - column),
            style,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_covers_cells_by_center() {
        let area = Rect::new(1, 1, 10, 4);
        let mut buf = Buffer::empty(Rect::new(0, 0, 12, 6));
        let mut surface = BufferSurface::new(&mut buf, area);

        surface.fill_rect(PxRect::new(0.0, 0.0, 16.0, 16.0), Rgb(1, 2, 3));

        assert_eq!(buf.get(1, 1).bg, Color::Rgb(1, 2, 3));
        assert_eq!(buf.get(2, 1).bg, Color::Rgb(1, 2, 3));
        assert_eq!(buf.get(3, 1).bg, Color::Reset);
        assert_eq!(buf.get(1, 2).bg, Color::Reset);
    }

    #[test]
    fn test_fill_is_clipped_to_area() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        let mut surface = BufferSurface::new(&mut buf, area);

        surface.fill_rect(PxRect::new(-100.0, -100.0, 1000.0, 1000.0), Rgb(9, 9, 9));

        assert!(buf.content().iter().all(|c| c.bg == Color::Rgb(9, 9, 9)));
    }

    #[test]
    fn test_label_is_centered_on_anchor() {
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        let mut surface = BufferSurface::new(&mut buf, area);

        surface.draw_label(Point::new(80.0, 40.0), "Out", false);

        assert_eq!(buf.get(8, 2).symbol(), "O");
        assert_eq!(buf.get(10, 2).symbol(), "t");
    }

    #[test]
    fn test_canvas_pixels() {
        let area = Rect::new(5, 5, 10, 3);

        assert_eq!(area_to_pixels(area), Size::new(80.0, 48.0));
        assert_eq!(cell_to_pixels(area, 5, 5), Point::new(4.0, 8.0));
    }
}
