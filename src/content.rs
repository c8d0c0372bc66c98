//! Content generators feeding the compositors

use crate::error::Result;
use crate::types::Color;
use crate::utils::ParameterValidator;
use image::{Rgb, RgbImage};
use imageproc::filter::box_filter;
use imageproc::map::{blue_channel, green_channel, red_channel};

/// Flat color fill with the given dimensions
#[must_use]
pub fn flat_fill(width: u32, height: u32, color: Color) -> RgbImage {
    RgbImage::from_pixel(width, height, color.to_rgb())
}

/// Box-blurred copy of `image` using a `kernel_size` x `kernel_size` window
///
/// Each channel is filtered independently. Edge pixels are extended outward.
///
/// # Errors
/// - `InvalidParameter` when `kernel_size` is zero or even
pub fn box_blur(image: &RgbImage, kernel_size: u32) -> Result<RgbImage> {
    ParameterValidator::validate_blur_kernel(kernel_size)?;
    let radius = kernel_size / 2;
    if radius == 0 {
        return Ok(image.clone());
    }

    let red = box_filter(&red_channel(image), radius, radius);
    let green = box_filter(&green_channel(image), radius, radius);
    let blue = box_filter(&blue_channel(image), radius, radius);

    Ok(RgbImage::from_fn(image.width(), image.height(), |x, y| {
        Rgb([
            red.get_pixel(x, y)[0],
            green.get_pixel(x, y)[0],
            blue.get_pixel(x, y)[0],
        ])
    }))
}
