//! platebox is the post-processing stage of a license-plate detector.
//!
//! Given the size of a source image it computes the stride-aligned input
//! resolution for the detection network. Given the network's objectness and
//! affine grids it decodes one axis-aligned box per confident cell, sorts
//! them by confidence, and removes duplicates with greedy IoU suppression.
//! Row-parallel decoding is available behind the `rayon` feature and image
//! loading behind `image-io`.

mod candidate;
pub mod decode;
pub mod detect;
pub mod geometry;
pub mod grid;
pub mod image;
pub mod lowlevel;
mod trace;
pub mod util;

pub use crate::detect::{Detection, Detector, DetectorConfig, PixelRect, PLATE_LABEL};
pub use crate::geometry::{
    compute_target_size, compute_target_size_with, ImageDimensions, NetworkInputSize,
    ResizeParams, STRIDE,
};
pub use crate::grid::{AffineGrid, GridBuffers, ProbabilityGrid};
pub use crate::image::{InputFormat, InputTensor};
pub use crate::util::{PlateBoxError, PlateBoxResult};

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use crate::candidate::nms::{iou, suppress};
pub use crate::candidate::sort::sort_candidates_desc;
pub use crate::decode::{decode, CandidateBox, Point};
