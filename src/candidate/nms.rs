//! Greedy IoU non-maximum suppression.

use crate::decode::CandidateBox;

/// Intersection over union of two axis-aligned boxes.
///
/// Returns `-1.0` when either box has non-positive width or height. Such
/// boxes therefore never exceed a suppression threshold: they are always
/// kept and never suppress another box.
pub fn iou(a: &CandidateBox, b: &CandidateBox) -> f32 {
    let (w1, h1) = (a.width(), a.height());
    let (w2, h2) = (b.width(), b.height());
    if w1 > 0.0 && w2 > 0.0 && h1 > 0.0 && h2 > 0.0 {
        let right = a.bottom_right.x.min(b.bottom_right.x);
        let bottom = a.bottom_right.y.min(b.bottom_right.y);
        let left = a.top_left.x.max(b.top_left.x);
        let top = a.top_left.y.max(b.top_left.y);
        let inter = (right - left).max(0.0) * (bottom - top).max(0.0);
        inter / (w1 * h1 + w2 * h2 - inter)
    } else {
        -1.0
    }
}

/// Keeps each box unless it overlaps an already kept box by more than `iou_threshold`.
///
/// `boxes` must be sorted by descending confidence; the kept boxes retain
/// that order.
pub fn suppress(boxes: &[CandidateBox], iou_threshold: f32) -> Vec<CandidateBox> {
    let mut kept = Vec::new();
    suppress_into(boxes, iou_threshold, &mut kept);
    kept
}

/// Like [`suppress`], writing into `kept` after clearing it.
pub fn suppress_into(boxes: &[CandidateBox], iou_threshold: f32, kept: &mut Vec<CandidateBox>) {
    kept.clear();

    'outer: for candidate in boxes.iter().copied() {
        for kept_box in kept.iter() {
            if iou(&candidate, kept_box) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(candidate);
    }
}
