use std::fmt;

use crate::error::{Result, VizError};

/// The `(rows, columns)` footprint of a layer.
///
/// Both dimensions are at least one. A heatmap's shape is fixed for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerShape {
    rows: usize,
    columns: usize,
}

impl LayerShape {
    /// Creates a new `LayerShape`.
    ///
    /// # Arguments
    /// * `rows` - Number of rows, must be at least one.
    /// * `columns` - Number of columns, must be at least one.
    ///
    /// # Returns
    /// The shape or `VizError::InvalidShape` if any dimension is zero.
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(VizError::InvalidShape(format!(
                "dimensions must be positive, got {rows}x{columns}"
            )));
        }

        Ok(Self { rows, columns })
    }

    /// Builds a shape from a backend shape descriptor.
    ///
    /// A single dimension is a column vector: `[rows]` becomes `rows x 1`.
    ///
    /// # Arguments
    /// * `dims` - One or two dimensions.
    ///
    /// # Returns
    /// The shape or `VizError::InvalidShape` for an empty, zero or higher rank descriptor.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        match *dims {
            [rows] => Self::new(rows, 1),
            [rows, columns] => Self::new(rows, columns),
            _ => Err(VizError::InvalidShape(format!(
                "expected one or two dimensions, got {dims:?}"
            ))),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total number of cells, `rows * columns`.
    pub fn len(&self) -> usize {
        self.rows * self.columns
    }

    /// Maps a row-major flat index to `(row, column)`.
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }
}

impl fmt::Display for LayerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

/// A `rows x columns` matrix of activation values, stored row-major.
///
/// Values are conceptually in `[0, 1]` but nothing here enforces it; the color
/// scale saturates anything outside.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationGrid {
    shape: LayerShape,
    values: Vec<f32>,
}

impl ActivationGrid {
    /// Creates a zero-filled grid.
    pub fn zeros(shape: LayerShape) -> Self {
        Self {
            shape,
            values: vec![0.0; shape.len()],
        }
    }

    /// Builds a grid from nested rows.
    ///
    /// # Arguments
    /// * `rows` - The matrix, one `Vec` per row.
    ///
    /// # Returns
    /// The grid, `VizError::InvalidShape` if it is empty or
    /// `VizError::MalformedGrid` if rows have different lengths.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        let shape = LayerShape::new(rows.len(), columns)?;

        let mut values = Vec::with_capacity(shape.len());
        for (row, data) in rows.into_iter().enumerate() {
            if data.len() != columns {
                return Err(VizError::MalformedGrid {
                    row,
                    expected: columns,
                    got: data.len(),
                });
            }
            values.extend(data);
        }

        Ok(Self { shape, values })
    }

    /// Builds a column vector (`len x 1`) from a flat list of values.
    pub fn column(values: Vec<f32>) -> Result<Self> {
        let shape = LayerShape::new(values.len(), 1)?;
        Ok(Self { shape, values })
    }

    pub fn shape(&self) -> LayerShape {
        self.shape
    }

    /// Returns the value at `(row, column)`, if inside the grid.
    pub fn get(&self, row: usize, column: usize) -> Option<f32> {
        if row >= self.shape.rows || column >= self.shape.columns {
            return None;
        }
        self.values.get(row * self.shape.columns + column).copied()
    }

    /// Lazily yields every value in row-major order.
    ///
    /// Index `i` corresponds to `self.shape().coords(i)`; both drawing and updating
    /// go through this iterator so they always agree on addressing.
    pub fn flatten_row_major(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    /// Replaces every value with the ones in `other`.
    ///
    /// # Returns
    /// `VizError::ShapeMismatch` if the shapes differ, in which case `self` is untouched.
    pub fn replace(&mut self, other: &ActivationGrid) -> Result<()> {
        if other.shape != self.shape {
            return Err(VizError::ShapeMismatch {
                layer: None,
                expected: self.shape,
                got: other.shape,
            });
        }

        self.values.copy_from_slice(&other.values);
        Ok(())
    }
}
