//! Error types for platebox.

use thiserror::Error;

/// Result alias for platebox operations.
pub type PlateBoxResult<T> = std::result::Result<T, PlateBoxError>;

/// Errors that can occur while sizing, decoding or suppressing detections.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlateBoxError {
    /// Source image dimensions are zero or the derived size overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u64, height: u64 },
    /// Grid dimensions disagree with each other or with the network input size.
    #[error("{context}: expected a {expected_rows}x{expected_cols} grid, got {rows}x{cols}")]
    GridMismatch {
        context: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
    /// A flat buffer does not hold exactly the declared shape.
    #[error("{context}: buffer holds {got} values, shape needs {needed}")]
    BufferLengthMismatch {
        context: &'static str,
        needed: usize,
        got: usize,
    },
    /// A flat buffer is shorter than the declared shape.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Configuration values were rejected.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Image loading or decoding failed.
    #[error("image I/O error: {reason}")]
    ImageIo { reason: String },
}
