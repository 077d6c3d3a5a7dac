//! Content polarity normalization
//!
//! Logos arrive as dark-on-light or light-on-dark artwork. After keying, the
//! normalizer makes foreground content consistently dark-toned so the light
//! variant reads well on a white page.

use crate::config::NormalizeConfig;
use image::{Rgba, RgbaImage};
use tracing::debug;

/// Perceptual luma of one pixel on a 0-255 scale
#[must_use]
pub fn luma(pixel: &Rgba<u8>) -> f64 {
    0.299 * f64::from(pixel[0]) + 0.587 * f64::from(pixel[1]) + 0.114 * f64::from(pixel[2])
}

/// Integer luma as produced by an 8-bit grayscale conversion
fn luma8(pixel: &Rgba<u8>) -> u32 {
    (u32::from(pixel[0]) * 19595 + u32::from(pixel[1]) * 38470 + u32::from(pixel[2]) * 7471
        + 0x8000)
        >> 16
}

fn is_foreground(pixel: &Rgba<u8>, alpha_threshold: u8) -> bool {
    pixel[3] > alpha_threshold
}

/// Mean luma over pixels with alpha above `alpha_threshold`
///
/// Returns `None` when the image has no such pixels.
#[must_use]
pub fn mean_foreground_luma(image: &RgbaImage, alpha_threshold: u8) -> Option<f64> {
    let (sum, count) = image
        .pixels()
        .filter(|p| is_foreground(p, alpha_threshold))
        .fold((0.0_f64, 0usize), |(sum, count), p| (sum + luma(p), count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Outcome of a normalization pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOutcome {
    /// Mean foreground luma before any change, `None` for an empty foreground
    pub mean_luma: Option<f64>,
    /// Number of pixels counted as foreground
    pub foreground_pixels: usize,
    /// Whether the foreground was inverted
    pub inverted: bool,
}

/// Ensure foreground content is dark-toned
#[must_use]
pub fn normalize_to_dark_content(image: &RgbaImage, config: &NormalizeConfig) -> RgbaImage {
    normalize_with_outcome(image, config).0
}

/// Same as [`normalize_to_dark_content`] but also reports what happened
#[must_use]
pub fn normalize_with_outcome(
    image: &RgbaImage,
    config: &NormalizeConfig,
) -> (RgbaImage, NormalizeOutcome) {
    let threshold = config.foreground_alpha_threshold;
    let mut output = image.clone();

    let foreground_pixels = image
        .pixels()
        .filter(|p| is_foreground(p, threshold))
        .count();

    let Some(mean_luma) = mean_foreground_luma(image, threshold) else {
        debug!("no foreground pixels, skipping normalization");
        return (
            output,
            NormalizeOutcome {
                mean_luma: None,
                foreground_pixels: 0,
                inverted: false,
            },
        );
    };

    let inverted = mean_luma > config.brightness_threshold;
    debug!(mean_luma, foreground_pixels, inverted, "content polarity");

    if inverted {
        for pixel in output.pixels_mut() {
            if is_foreground(pixel, threshold) {
                for channel in &mut pixel.0[..3] {
                    *channel = 255 - *channel;
                }
            }
        }
        enhance_foreground_contrast(&mut output, threshold, config.contrast_factor);
    }

    (
        output,
        NormalizeOutcome {
            mean_luma: Some(mean_luma),
            foreground_pixels,
            inverted,
        },
    )
}

/// Stretch foreground channels away from their mean grey level
///
/// The grey level is the rounded mean 8-bit luma of the foreground. Each channel
/// becomes `mean + factor * (value - mean)`, clamped and truncated to a byte.
fn enhance_foreground_contrast(image: &mut RgbaImage, alpha_threshold: u8, factor: f64) {
    let (sum, count) = image
        .pixels()
        .filter(|p| is_foreground(p, alpha_threshold))
        .fold((0u64, 0u64), |(sum, count), p| {
            (sum + u64::from(luma8(p)), count + 1)
        });

    if count == 0 {
        return;
    }

    let mean = (sum as f64 / count as f64 + 0.5).floor() as f32;
    let factor = factor as f32;

    for pixel in image.pixels_mut() {
        if !is_foreground(pixel, alpha_threshold) {
            continue;
        }
        for channel in &mut pixel.0[..3] {
            let value = mean + factor * (f32::from(*channel) - mean);
            *channel = if value <= 0.0 {
                0
            } else if value >= 255.0 {
                255
            } else {
                value as u8
            };
        }
    }
}
