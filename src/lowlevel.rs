//! Low-level building blocks for custom post-processing pipelines.
//!
//! These expose the individual stages behind [`crate::Detector`]: buffer
//! reusing decode and suppression, the per-cell affine map, and pixel
//! mapping. Most users should prefer `Detector`.

pub use crate::candidate::nms::{iou, suppress, suppress_into};
pub use crate::candidate::sort::sort_candidates_desc;
pub use crate::decode::{decode, decode_into, AffineCell, CandidateBox, Point, CORNER_SCALE};
pub use crate::detect::to_detections;
pub use crate::grid::{AFFINE_CHANNEL_OFFSET, AFFINE_PARAMS, OUTPUT_CHANNELS, PROB_CHANNEL};
pub use crate::image::{pack_rgb_normalized, pack_rgb_u8};

#[cfg(feature = "rayon")]
pub use crate::decode::rayon::{decode_par, decode_par_into};
