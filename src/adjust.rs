//! Per-asset adjustments applied around keying
//!
//! These are the small fixups some source artwork needs (cropping away a
//! wordmark, tightening to content, recoloring a white-only logo). They are
//! driven by manifest data and never run unless an asset asks for them.

use crate::{
    config::HexColor,
    error::{LogoError, Result},
};
use image::{imageops, Rgba, RgbaImage};
use tracing::debug;

/// Keep only the top `fraction` of the image rows
///
/// # Errors
/// Returns `LogoError::InvalidConfig` when `fraction` is not in `(0, 1]`.
pub fn crop_top(image: &RgbaImage, fraction: f64) -> Result<RgbaImage> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(LogoError::config_value_error(
            "crop_top_fraction",
            fraction,
            "greater than 0.0 and at most 1.0",
            Some(0.7),
        ));
    }

    let height = ((f64::from(image.height()) * fraction) as u32).max(1);
    let height = height.min(image.height());
    debug!(from = image.height(), to = height, "cropping to top rows");

    Ok(imageops::crop_imm(image, 0, 0, image.width(), height).to_image())
}

/// Bounding box `(x, y, width, height)` of pixels with non-zero alpha
#[must_use]
pub fn content_bounds(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        });
    }

    bounds.map(|(min_x, min_y, max_x, max_y)| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Crop to the visible content; fully transparent images are returned unchanged
#[must_use]
pub fn trim_to_content(image: &RgbaImage) -> RgbaImage {
    match content_bounds(image) {
        Some((x, y, width, height)) => {
            debug!(x, y, width, height, "trimming to content");
            imageops::crop_imm(image, x, y, width, height).to_image()
        },
        None => image.clone(),
    }
}

/// Paint visible near-white pixels with `color`, keeping their alpha
///
/// A pixel qualifies when every RGB channel is strictly above `threshold`.
#[must_use]
pub fn recolor_near_white(image: &RgbaImage, threshold: u8, color: HexColor) -> RgbaImage {
    let [r, g, b] = color.rgb();
    let mut output = image.clone();
    for pixel in output.pixels_mut() {
        if pixel[3] > 0 && pixel.0[..3].iter().all(|&c| c > threshold) {
            *pixel = Rgba([r, g, b, pixel[3]]);
        }
    }
    output
}
