//! Network input packing.
//!
//! Float models take an HWC `f32` tensor with RGB channels scaled to [0, 1];
//! quantized models take the raw HWC `u8` bytes. Resizing the source bitmap
//! to the target size is left to the caller, or to the helpers in `io` when
//! the `image-io` feature is enabled.

use crate::util::{PlateBoxError, PlateBoxResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Channels per pixel in the packed tensor.
pub const INPUT_CHANNELS: usize = 3;

/// Element type of the network input tensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// `f32` channels divided by 255.
    #[default]
    Float,
    /// Raw `u8` channels, for quantized models.
    Quantized,
}

/// A packed HWC input tensor.
#[derive(Clone, Debug, PartialEq)]
pub enum InputTensor {
    Float(Vec<f32>),
    Quantized(Vec<u8>),
}

impl InputTensor {
    /// Packs interleaved RGB bytes in the requested format.
    pub fn pack(
        rgb: &[u8],
        width: usize,
        height: usize,
        format: InputFormat,
    ) -> PlateBoxResult<Self> {
        match format {
            InputFormat::Float => {
                let mut out = Vec::new();
                pack_rgb_normalized(rgb, width, height, &mut out)?;
                Ok(Self::Float(out))
            }
            InputFormat::Quantized => {
                let mut out = Vec::new();
                pack_rgb_u8(rgb, width, height, &mut out)?;
                Ok(Self::Quantized(out))
            }
        }
    }

    /// Returns the format of the tensor.
    pub fn format(&self) -> InputFormat {
        match self {
            Self::Float(_) => InputFormat::Float,
            Self::Quantized(_) => InputFormat::Quantized,
        }
    }

    /// Number of packed values.
    pub fn len(&self) -> usize {
        match self {
            Self::Float(data) => data.len(),
            Self::Quantized(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the float data, if this is a float tensor.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::Float(data) => Some(data),
            Self::Quantized(_) => None,
        }
    }

    /// Returns the byte data, if this is a quantized tensor.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            Self::Quantized(data) => Some(data),
            Self::Float(_) => None,
        }
    }
}

fn packed_len(rgb: &[u8], width: usize, height: usize) -> PlateBoxResult<usize> {
    if width == 0 || height == 0 {
        return Err(PlateBoxError::InvalidDimensions {
            width: width as u64,
            height: height as u64,
        });
    }
    let needed = width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(INPUT_CHANNELS))
        .ok_or(PlateBoxError::InvalidDimensions {
            width: width as u64,
            height: height as u64,
        })?;
    if rgb.len() < needed {
        return Err(PlateBoxError::BufferTooSmall {
            needed,
            got: rgb.len(),
        });
    }
    Ok(needed)
}

/// Packs interleaved RGB bytes into a normalized HWC tensor.
///
/// `out` is cleared and refilled with `width * height * 3` values; its
/// allocation is reused across calls.
pub fn pack_rgb_normalized(
    rgb: &[u8],
    width: usize,
    height: usize,
    out: &mut Vec<f32>,
) -> PlateBoxResult<()> {
    let needed = packed_len(rgb, width, height)?;
    out.clear();
    out.extend(rgb[..needed].iter().map(|&v| f32::from(v) / 255.0));
    Ok(())
}

/// Copies interleaved RGB bytes into a quantized HWC tensor.
///
/// Same layout and buffer reuse as [`pack_rgb_normalized`], without scaling.
pub fn pack_rgb_u8(
    rgb: &[u8],
    width: usize,
    height: usize,
    out: &mut Vec<u8>,
) -> PlateBoxResult<()> {
    let needed = packed_len(rgb, width, height)?;
    out.clear();
    out.extend_from_slice(&rgb[..needed]);
    Ok(())
}
