//! Owned, reusable grid storage.

use super::{
    check_input_size, AffineGrid, ProbabilityGrid, AFFINE_CHANNEL_OFFSET, AFFINE_PARAMS,
    OUTPUT_CHANNELS, PROB_CHANNEL,
};
use crate::geometry::NetworkInputSize;
use crate::util::{PlateBoxError, PlateBoxResult};

/// Probability and affine grids for one network input size.
///
/// Resizing to a new shape keeps the allocated capacity, so a stream of
/// frames with the same (or smaller) input size does not reallocate.
#[derive(Clone, Debug, Default)]
pub struct GridBuffers {
    rows: usize,
    cols: usize,
    probs: Vec<f32>,
    affines: Vec<f32>,
}

impl GridBuffers {
    /// Creates empty buffers with no shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates zeroed buffers shaped for `size`.
    pub fn with_size(size: NetworkInputSize) -> Self {
        let mut buffers = Self::new();
        buffers.resize(size);
        buffers
    }

    /// Reshapes the buffers for `size`, zeroing their contents.
    pub fn resize(&mut self, size: NetworkInputSize) {
        self.rows = size.grid_rows();
        self.cols = size.grid_cols();
        let cells = self.rows * self.cols;
        self.probs.clear();
        self.probs.resize(cells, 0.0);
        self.affines.clear();
        self.affines.resize(cells * AFFINE_PARAMS, 0.0);
    }

    /// Returns `true` if the buffers are currently shaped for `size`.
    pub fn matches(&self, size: NetworkInputSize) -> bool {
        self.rows == size.grid_rows() && self.cols == size.grid_cols()
    }

    /// Returns the current number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the current number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Splits a raw `[rows, cols, 8]` output tensor into the two grids.
    ///
    /// Channel 0 becomes the probability, channels 2..8 the affine
    /// parameters; channel 1 is not used by the decoder.
    pub fn fill_from_tensor(
        &mut self,
        size: NetworkInputSize,
        tensor: &[f32],
    ) -> PlateBoxResult<()> {
        let needed = size.grid_rows() * size.grid_cols() * OUTPUT_CHANNELS;
        if tensor.len() != needed {
            return Err(PlateBoxError::BufferLengthMismatch {
                context: "output tensor",
                needed,
                got: tensor.len(),
            });
        }
        if !self.matches(size) {
            self.resize(size);
        }

        let cells = tensor.chunks_exact(OUTPUT_CHANNELS);
        let targets = self
            .probs
            .iter_mut()
            .zip(self.affines.chunks_exact_mut(AFFINE_PARAMS));
        for (cell, (prob, affine)) in cells.zip(targets) {
            *prob = cell[PROB_CHANNEL];
            let params = &cell[AFFINE_CHANNEL_OFFSET..AFFINE_CHANNEL_OFFSET + AFFINE_PARAMS];
            affine.copy_from_slice(params);
        }
        Ok(())
    }

    /// Mutable access to the probability and affine buffers.
    ///
    /// Inference can write into these in place after
    /// [`crate::Detector::prepare_grids`] has shaped them.
    pub fn as_mut_slices(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.probs, &mut self.affines)
    }

    /// Returns a view of the probability grid.
    pub fn probs(&self) -> ProbabilityGrid<'_> {
        ProbabilityGrid {
            data: &self.probs,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Returns a view of the affine grid.
    pub fn affines(&self) -> AffineGrid<'_> {
        AffineGrid {
            data: &self.affines,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Checks the current shape against `size`.
    pub fn check_size(&self, size: NetworkInputSize) -> PlateBoxResult<()> {
        check_input_size(size, self.rows, self.cols)
    }
}
