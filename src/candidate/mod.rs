//! Candidate ordering and pruning.
//!
//! Includes the stable confidence sort and greedy IoU suppression.

pub(crate) mod nms;
pub(crate) mod sort;
