//! Affine box decoding.
//!
//! Every cell whose probability reaches the threshold carries a 2x3 affine
//! map from a unit square centred on the cell to the plate quadrilateral.
//! The four mapped corners are scaled by [`CORNER_SCALE`], offset to the cell
//! centre, normalized by the grid size and reduced to an axis-aligned box.

use crate::grid::{check_same_shape, AffineGrid, ProbabilityGrid, AFFINE_PARAMS};
use crate::util::math::min_max4;
use crate::util::PlateBoxResult;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Scale from the unit square to grid-cell units.
pub const CORNER_SCALE: f32 = 7.75;

/// Unit-square corners centred at the origin, in winding order.
const UNIT_SQUARE: [[f32; 2]; 4] = [[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]];

/// Point in normalized image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned candidate box in normalized image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateBox {
    /// Objectness score of the source cell.
    pub confidence: f32,
    /// Minimum corner.
    pub top_left: Point,
    /// Maximum corner.
    pub bottom_right: Point,
}

impl CandidateBox {
    /// Returns the box width (may be non-positive for degenerate boxes).
    pub fn width(&self) -> f32 {
        self.bottom_right.x - self.top_left.x
    }

    /// Returns the box height (may be non-positive for degenerate boxes).
    pub fn height(&self) -> f32 {
        self.bottom_right.y - self.top_left.y
    }
}

/// 2x3 affine map of one grid cell with clamped scale terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffineCell {
    m: [[f32; 3]; 2],
}

impl AffineCell {
    /// Builds the map from `(a00, a01, a02, a10, a11, a12)`.
    ///
    /// The diagonal terms are clamped to be non-negative: a negative scale
    /// collapses the box instead of mirroring it.
    pub fn from_params(p: &[f32; AFFINE_PARAMS]) -> Self {
        Self {
            m: [[p[0].max(0.0), p[1], p[2]], [p[3], p[4].max(0.0), p[5]]],
        }
    }

    /// Returns the matrix rows.
    pub fn matrix(&self) -> [[f32; 3]; 2] {
        self.m
    }

    /// Applies the map to the homogeneous point `(x, y, 1)`.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [r0, r1] = self.m;
        (
            r0[0] * x + r0[1] * y + r0[2],
            r1[0] * x + r1[1] * y + r1[2],
        )
    }

    /// Decodes the map for cell `(row, col)` of a `rows x cols` grid.
    pub fn to_box(
        &self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
        confidence: f32,
    ) -> CandidateBox {
        let cx = col as f32 + 0.5;
        let cy = row as f32 + 0.5;
        let cols = cols as f32;
        let rows = rows as f32;

        let mut xs = [0.0f32; 4];
        let mut ys = [0.0f32; 4];
        for (k, [ux, uy]) in UNIT_SQUARE.into_iter().enumerate() {
            let (px, py) = self.apply(ux, uy);
            xs[k] = (px * CORNER_SCALE + cx) / cols;
            ys[k] = (py * CORNER_SCALE + cy) / rows;
        }

        let (min_x, max_x) = min_max4(xs);
        let (min_y, max_y) = min_max4(ys);
        CandidateBox {
            confidence,
            top_left: Point { x: min_x, y: min_y },
            bottom_right: Point { x: max_x, y: max_y },
        }
    }
}

/// Decodes every cell with `prob >= threshold`, in row-major order.
pub fn decode(
    probs: ProbabilityGrid<'_>,
    affines: AffineGrid<'_>,
    threshold: f32,
) -> PlateBoxResult<Vec<CandidateBox>> {
    let mut out = Vec::new();
    decode_into(probs, affines, threshold, &mut out)?;
    Ok(out)
}

/// Like [`decode`], writing into `out` after clearing it.
pub fn decode_into(
    probs: ProbabilityGrid<'_>,
    affines: AffineGrid<'_>,
    threshold: f32,
    out: &mut Vec<CandidateBox>,
) -> PlateBoxResult<()> {
    check_same_shape(&probs, &affines)?;
    out.clear();
    for row in 0..probs.rows() {
        decode_row(probs, affines, threshold, row, out);
    }
    Ok(())
}

/// Decodes one grid row, appending to `out`. Shapes must already agree.
pub(crate) fn decode_row(
    probs: ProbabilityGrid<'_>,
    affines: AffineGrid<'_>,
    threshold: f32,
    row: usize,
    out: &mut Vec<CandidateBox>,
) {
    let (Some(prob_row), Some(affine_row)) = (probs.row(row), affines.row(row)) else {
        return;
    };
    let (rows, cols) = (probs.rows(), probs.cols());
    for (col, (&prob, params)) in prob_row
        .iter()
        .zip(affine_row.chunks_exact(AFFINE_PARAMS))
        .enumerate()
    {
        if prob >= threshold {
            let Ok(params) = <&[f32; AFFINE_PARAMS]>::try_from(params) else {
                continue;
            };
            out.push(AffineCell::from_params(params).to_box(row, col, rows, cols, prob));
        }
    }
}
