//! Rayon row-parallel decoding (feature-gated).
//!
//! Rows are decoded independently and concatenated in row order, so the
//! output is identical to the sequential decoder, including tie order.

use crate::decode::{decode_row, CandidateBox};
use crate::grid::{check_same_shape, AffineGrid, ProbabilityGrid};
use crate::util::PlateBoxResult;
use rayon::prelude::*;

/// Row-parallel version of [`crate::decode::decode`].
pub fn decode_par(
    probs: ProbabilityGrid<'_>,
    affines: AffineGrid<'_>,
    threshold: f32,
) -> PlateBoxResult<Vec<CandidateBox>> {
    let mut out = Vec::new();
    decode_par_into(probs, affines, threshold, &mut out)?;
    Ok(out)
}

/// Row-parallel version of [`crate::decode::decode_into`].
pub fn decode_par_into(
    probs: ProbabilityGrid<'_>,
    affines: AffineGrid<'_>,
    threshold: f32,
    out: &mut Vec<CandidateBox>,
) -> PlateBoxResult<()> {
    check_same_shape(&probs, &affines)?;

    let row_results: Vec<Vec<CandidateBox>> = (0..probs.rows())
        .into_par_iter()
        .map(|row| {
            let mut row_boxes = Vec::new();
            decode_row(probs, affines, threshold, row, &mut row_boxes);
            row_boxes
        })
        .collect();

    out.clear();
    for boxes in row_results {
        out.extend(boxes);
    }
    Ok(())
}
