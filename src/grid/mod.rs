//! Borrowed views over the network output grids.
//!
//! Both grids are stored row-major. The probability grid holds one value per
//! cell; the affine grid holds [`AFFINE_PARAMS`] values per cell in the
//! order `(a00, a01, a02, a10, a11, a12)`. Views are validated on creation so
//! the decoder can walk them without further bounds checks failing.

use crate::geometry::NetworkInputSize;
use crate::util::{PlateBoxError, PlateBoxResult};

mod buffers;

pub use buffers::GridBuffers;

/// Parameters per cell in the affine grid.
pub const AFFINE_PARAMS: usize = 6;
/// Channels per cell in the raw network output tensor.
pub const OUTPUT_CHANNELS: usize = 8;
/// Channel carrying the objectness probability.
pub const PROB_CHANNEL: usize = 0;
/// First channel of the affine parameters.
pub const AFFINE_CHANNEL_OFFSET: usize = 2;

/// Row-major view of per-cell objectness scores.
#[derive(Clone, Copy, Debug)]
pub struct ProbabilityGrid<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> ProbabilityGrid<'a> {
    /// Creates a view over exactly `rows * cols` values.
    pub fn new(data: &'a [f32], rows: usize, cols: usize) -> PlateBoxResult<Self> {
        let needed = cell_count(rows, cols)?;
        if data.len() != needed {
            return Err(PlateBoxError::BufferLengthMismatch {
                context: "probability grid",
                needed,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Returns the number of grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of grid columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the score at `(row, col)` if it is within bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// Returns the scores of row `row`.
    pub fn row(&self, row: usize) -> Option<&'a [f32]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        self.data.get(start..start + self.cols)
    }
}

/// Row-major view of per-cell affine parameters.
#[derive(Clone, Copy, Debug)]
pub struct AffineGrid<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
}

impl<'a> AffineGrid<'a> {
    /// Creates a view over exactly `rows * cols * 6` values.
    pub fn new(data: &'a [f32], rows: usize, cols: usize) -> PlateBoxResult<Self> {
        let needed = cell_count(rows, cols)?
            .checked_mul(AFFINE_PARAMS)
            .ok_or(PlateBoxError::InvalidDimensions {
                width: cols as u64,
                height: rows as u64,
            })?;
        if data.len() != needed {
            return Err(PlateBoxError::BufferLengthMismatch {
                context: "affine grid",
                needed,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Returns the number of grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of grid columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the six parameters of cell `(row, col)`.
    pub fn params(&self, row: usize, col: usize) -> Option<&'a [f32; AFFINE_PARAMS]> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let start = (row * self.cols + col) * AFFINE_PARAMS;
        self.data
            .get(start..start + AFFINE_PARAMS)
            .and_then(|cell| cell.try_into().ok())
    }

    /// Returns the parameters of row `row`, `cols * 6` values.
    pub fn row(&self, row: usize) -> Option<&'a [f32]> {
        if row >= self.rows {
            return None;
        }
        let width = self.cols * AFFINE_PARAMS;
        let start = row * width;
        self.data.get(start..start + width)
    }
}

/// Checks that both grids have the same shape.
pub(crate) fn check_same_shape(
    probs: &ProbabilityGrid<'_>,
    affines: &AffineGrid<'_>,
) -> PlateBoxResult<()> {
    if probs.rows() != affines.rows() || probs.cols() != affines.cols() {
        return Err(PlateBoxError::GridMismatch {
            context: "affine grid vs probability grid",
            expected_rows: probs.rows(),
            expected_cols: probs.cols(),
            rows: affines.rows(),
            cols: affines.cols(),
        });
    }
    Ok(())
}

/// Checks that a grid matches the stride-derived shape of `size`.
pub(crate) fn check_input_size(
    size: NetworkInputSize,
    rows: usize,
    cols: usize,
) -> PlateBoxResult<()> {
    if rows != size.grid_rows() || cols != size.grid_cols() {
        return Err(PlateBoxError::GridMismatch {
            context: "grid vs network input size",
            expected_rows: size.grid_rows(),
            expected_cols: size.grid_cols(),
            rows,
            cols,
        });
    }
    Ok(())
}

fn cell_count(rows: usize, cols: usize) -> PlateBoxResult<usize> {
    if rows == 0 || cols == 0 {
        return Err(PlateBoxError::InvalidDimensions {
            width: cols as u64,
            height: rows as u64,
        });
    }
    rows.checked_mul(cols)
        .ok_or(PlateBoxError::InvalidDimensions {
            width: cols as u64,
            height: rows as u64,
        })
}
