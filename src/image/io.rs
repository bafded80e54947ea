//! Loading and resizing images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::geometry::{compute_target_size_with, ImageDimensions, NetworkInputSize, ResizeParams};
use crate::image::{InputFormat, InputTensor};
use crate::util::{PlateBoxError, PlateBoxResult};

/// A source image resized and packed for the network.
#[derive(Clone, Debug)]
pub struct NetworkInput {
    /// Dimensions of the source image, used to map detections back.
    pub dims: ImageDimensions,
    /// Resolution the tensor was packed at.
    pub size: NetworkInputSize,
    /// HWC tensor of `size.height() * size.width() * 3` values.
    pub tensor: InputTensor,
}

/// Reads the dimensions of a decoded image.
pub fn dimensions_of(img: &DynamicImage) -> PlateBoxResult<ImageDimensions> {
    ImageDimensions::new(img.width(), img.height())
}

/// Resizes `img` to its network input size (nearest neighbour) and packs it
/// as `format`.
pub fn network_input_from_dynamic(
    img: &DynamicImage,
    params: &ResizeParams,
    format: InputFormat,
) -> PlateBoxResult<NetworkInput> {
    let dims = dimensions_of(img)?;
    let size = compute_target_size_with(dims, params)?;

    let rgb = img.to_rgb8();
    let resized = image::imageops::resize(&rgb, size.width(), size.height(), FilterType::Nearest);

    let tensor = InputTensor::pack(
        resized.as_raw(),
        size.width() as usize,
        size.height() as usize,
        format,
    )?;
    Ok(NetworkInput { dims, size, tensor })
}

/// Loads an image from disk and prepares its network input.
pub fn load_network_input<P: AsRef<Path>>(
    path: P,
    params: &ResizeParams,
    format: InputFormat,
) -> PlateBoxResult<NetworkInput> {
    let img = image::open(path).map_err(|err| PlateBoxError::ImageIo {
        reason: err.to_string(),
    })?;
    network_input_from_dynamic(&img, params, format)
}

/// Loads an image from disk and returns only its dimensions.
pub fn load_dimensions<P: AsRef<Path>>(path: P) -> PlateBoxResult<ImageDimensions> {
    let (width, height) = image::image_dimensions(path).map_err(|err| PlateBoxError::ImageIo {
        reason: err.to_string(),
    })?;
    ImageDimensions::new(width, height)
}
