//! Detections in pixel coordinates of the source image.

use crate::decode::CandidateBox;
use crate::geometry::ImageDimensions;

/// Label attached to every detection.
pub const PLATE_LABEL: &str = "LP";

/// Pixel area a plate must exceed to be worth cropping for recognition.
pub const MIN_PLAUSIBLE_AREA: f32 = 200.0;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PixelRect {
    /// Scales a normalized candidate box to an image of `dims`.
    pub fn from_normalized(candidate: &CandidateBox, dims: ImageDimensions) -> Self {
        let width = dims.width() as f32;
        let height = dims.height() as f32;
        Self {
            left: candidate.top_left.x * width,
            top: candidate.top_left.y * height,
            right: candidate.bottom_right.x * width,
            bottom: candidate.bottom_right.y * height,
        }
    }

    /// Horizontal extent, `right - left`.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Vertical extent, `bottom - top`.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Area in square pixels; non-positive for degenerate boxes.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// A detected license plate.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    id: String,
    label: &'static str,
    confidence: f32,
    rect: PixelRect,
}

impl Detection {
    /// Creates a detection with ordinal `index`.
    pub fn new(index: usize, confidence: f32, rect: PixelRect) -> Self {
        Self {
            id: index.to_string(),
            label: PLATE_LABEL,
            confidence,
            rect,
        }
    }

    /// Ordinal id in output order (`"0"`, `"1"`, ...).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Always [`PLATE_LABEL`].
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Objectness score of the decoded cell.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Box in pixel coordinates.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Returns `true` if the box is large enough to hold a readable plate.
    pub fn is_plausible(&self) -> bool {
        self.rect.area() > MIN_PLAUSIBLE_AREA
    }

    /// Returns the detection shifted by `(dx, dy)`.
    ///
    /// Used when detection ran on a crop (e.g. a vehicle box) whose top-left
    /// corner sits at `(dx, dy)` in the parent frame.
    pub fn offset_by(&self, dx: f32, dy: f32) -> Self {
        let rect = PixelRect {
            left: self.rect.left + dx,
            top: self.rect.top + dy,
            right: self.rect.right + dx,
            bottom: self.rect.bottom + dy,
        };
        Self {
            rect,
            ..self.clone()
        }
    }
}

/// Maps kept candidates to detections with ordinal ids.
pub fn to_detections(kept: &[CandidateBox], dims: ImageDimensions) -> Vec<Detection> {
    kept.iter()
        .enumerate()
        .map(|(idx, candidate)| {
            Detection::new(
                idx,
                candidate.confidence,
                PixelRect::from_normalized(candidate, dims),
            )
        })
        .collect()
}
