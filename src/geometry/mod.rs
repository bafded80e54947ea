//! Network input sizing.
//!
//! The detector network accepts any input whose sides are multiples of its
//! stride. The source image is scaled so that its short side lands near a
//! reference resolution that grows with the aspect ratio, capped at
//! [`MAX_BOUND_DIM`], and both sides are then aligned up to the stride.
//!
//! All arithmetic is done on integers so that the computed shape does not
//! depend on float rounding of the aspect ratio.

use crate::util::math::{align_up, div_round};
use crate::util::{PlateBoxError, PlateBoxResult};

/// Downsampling factor between network input and output grid.
pub const STRIDE: u32 = 16;
/// Target short-side resolution for a square image.
pub const SHORT_SIDE_REF: u32 = 288;
/// Cap applied to the scaled short side before stride alignment.
pub const MAX_BOUND_DIM: u32 = 608;

/// Dimensions of a source image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageDimensions {
    width: u32,
    height: u32,
}

impl ImageDimensions {
    /// Creates dimensions, rejecting zero width or height.
    pub fn new(width: u32, height: u32) -> PlateBoxResult<Self> {
        if width == 0 || height == 0 {
            return Err(PlateBoxError::InvalidDimensions {
                width: u64::from(width),
                height: u64::from(height),
            });
        }
        Ok(Self { width, height })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Stride-aligned input resolution for the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NetworkInputSize {
    width: u32,
    height: u32,
    stride: u32,
}

impl NetworkInputSize {
    /// Creates a size from explicit dimensions that must be non-zero multiples of `stride`.
    pub fn new(width: u32, height: u32, stride: u32) -> PlateBoxResult<Self> {
        if stride == 0 {
            return Err(PlateBoxError::InvalidConfig {
                reason: "stride must be > 0",
            });
        }
        if width == 0 || height == 0 || width % stride != 0 || height % stride != 0 {
            return Err(PlateBoxError::InvalidDimensions {
                width: u64::from(width),
                height: u64::from(height),
            });
        }
        Ok(Self {
            width,
            height,
            stride,
        })
    }

    /// Returns the network input width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the network input height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the stride the size is aligned to.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Number of output grid rows (`height / stride`).
    pub fn grid_rows(&self) -> usize {
        (self.height / self.stride) as usize
    }

    /// Number of output grid columns (`width / stride`).
    pub fn grid_cols(&self) -> usize {
        (self.width / self.stride) as usize
    }
}

/// Parameters of the sizing rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResizeParams {
    /// Short-side resolution used for a square source.
    pub short_side: u32,
    /// Cap on the scaled short side before alignment.
    pub max_bound: u32,
    /// Alignment of both output sides.
    pub stride: u32,
}

impl Default for ResizeParams {
    fn default() -> Self {
        Self {
            short_side: SHORT_SIDE_REF,
            max_bound: MAX_BOUND_DIM,
            stride: STRIDE,
        }
    }
}

impl ResizeParams {
    /// Validates that every parameter is non-zero.
    pub fn validate(&self) -> PlateBoxResult<()> {
        if self.short_side == 0 {
            return Err(PlateBoxError::InvalidConfig {
                reason: "short_side must be > 0",
            });
        }
        if self.max_bound == 0 {
            return Err(PlateBoxError::InvalidConfig {
                reason: "max_bound must be > 0",
            });
        }
        if self.stride == 0 {
            return Err(PlateBoxError::InvalidConfig {
                reason: "stride must be > 0",
            });
        }
        Ok(())
    }
}

/// Computes the network input size for a `src_w x src_h` image with default parameters.
pub fn compute_target_size(src_w: u32, src_h: u32) -> PlateBoxResult<NetworkInputSize> {
    compute_target_size_with(ImageDimensions::new(src_w, src_h)?, &ResizeParams::default())
}

/// Computes the network input size for `dims` using `params`.
///
/// The scaled short side is `min(side + side % stride, max_bound)` where
/// `side = floor(short_side * long / short)`. That offset is not a true
/// round-up, and alignment happens after the cap, so the short side can
/// exceed `max_bound` by less than one stride. Networks exported for this rule
/// expect exactly these shapes.
pub fn compute_target_size_with(
    dims: ImageDimensions,
    params: &ResizeParams,
) -> PlateBoxResult<NetworkInputSize> {
    params.validate()?;

    let src_w = u64::from(dims.width);
    let src_h = u64::from(dims.height);
    let short = src_w.min(src_h);
    let stride = u64::from(params.stride);

    let side = long_side_target(dims, params);
    let bound = (side + side % stride).min(u64::from(params.max_bound));

    // Both factors fit in u32, so the products cannot overflow u64.
    let w = div_round(src_w * bound, short);
    let h = div_round(src_h * bound, short);
    let overflow = PlateBoxError::InvalidDimensions {
        width: w,
        height: h,
    };

    let aligned = |v: u64| {
        align_up(v, stride)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| overflow.clone())
    };
    let width = aligned(w)?;
    let height = aligned(h)?;
    NetworkInputSize::new(width, height, params.stride)
}

/// Aspect-scaled reference side, `floor(short_side * long / short)`.
///
/// This is the value the stride offset and cap are applied to in
/// [`compute_target_size_with`]; it grows with the aspect ratio.
pub fn long_side_target(dims: ImageDimensions, params: &ResizeParams) -> u64 {
    let long = u64::from(dims.width.max(dims.height));
    let short = u64::from(dims.width.min(dims.height));
    u64::from(params.short_side) * long / short
}
