use crate::{geometry::Size, grid::LayerShape, transition::Lerp};

/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

// Viridis sampled at 0.0, 0.1, ..., 1.0.
const VIRIDIS: [Rgb; 11] = [
    Rgb(68, 1, 84),
    Rgb(72, 36, 117),
    Rgb(65, 68, 135),
    Rgb(53, 95, 141),
    Rgb(42, 120, 142),
    Rgb(33, 145, 140),
    Rgb(34, 168, 132),
    Rgb(68, 191, 112),
    Rgb(122, 209, 81),
    Rgb(189, 223, 38),
    Rgb(253, 231, 37),
];

/// Maps an activation onto the viridis sequential scale.
///
/// The domain is fixed to `[0, 1]` whatever the data looks like: values outside
/// saturate at the endpoints and `NaN` is drawn as the low endpoint.
pub fn value_to_color(v: f32) -> Rgb {
    let last = VIRIDIS.len() - 1;
    if v.is_nan() || v <= 0.0 {
        return VIRIDIS[0];
    }
    if v >= 1.0 {
        return VIRIDIS[last];
    }

    let scaled = f64::from(v) * last as f64;
    let i = (scaled.floor() as usize).min(last - 1);
    VIRIDIS[i].lerp(VIRIDIS[i + 1], scaled - i as f64)
}

/// Linear mapping from grid coordinates to pixels for one pixel budget.
///
/// Always rebuilt from scratch on resize so repeated resizes never drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMapper {
    rows: usize,
    columns: usize,
    pixels: Size,
}

impl ScaleMapper {
    /// Creates a new `ScaleMapper`.
    ///
    /// # Arguments
    /// * `shape` - The grid being mapped.
    /// * `pixels` - The total pixel budget of the grid.
    pub fn new(shape: LayerShape, pixels: Size) -> Self {
        Self {
            rows: shape.rows(),
            columns: shape.columns(),
            pixels,
        }
    }

    /// Left edge of `col`. Not clamped: `columns` maps onto the right edge.
    pub fn column_to_x(&self, col: f64) -> f64 {
        let t = col / self.columns as f64;
        self.pixels.width * t
    }

    /// Top edge of `row`. Not clamped: `rows` maps onto the bottom edge.
    pub fn row_to_y(&self, row: f64) -> f64 {
        let t = row / self.rows as f64;
        self.pixels.height * t
    }

    pub fn cell_width(&self) -> f64 {
        self.pixels.width / self.columns as f64
    }

    pub fn cell_height(&self) -> f64 {
        self.pixels.height / self.rows as f64
    }

    pub fn pixels(&self) -> Size {
        self.pixels
    }

    pub fn value_to_color(&self, v: f32) -> Rgb {
        value_to_color(v)
    }
}
