//! Confidence ordering for candidate boxes.

use std::cmp::Ordering;

use crate::decode::CandidateBox;

fn confidence_cmp_desc(a: &CandidateBox, b: &CandidateBox) -> Ordering {
    b.confidence.total_cmp(&a.confidence)
}

/// Sorts candidates by descending confidence.
///
/// The sort is stable: equal confidences keep their decode emission order.
pub fn sort_candidates_desc(boxes: &mut [CandidateBox]) {
    boxes.sort_by(confidence_cmp_desc);
}
