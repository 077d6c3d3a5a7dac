//! Background keying
//!
//! Classifies pixels as background by comparing each channel against a
//! reference color sampled from the top-left corner, then zeroes their alpha.

use crate::config::KeyingConfig;
use image::{Rgba, RgbaImage};
use tracing::debug;

/// Reference color and tolerance chosen for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyingDecision {
    pub reference: [u8; 3],
    pub tolerance: u8,
}

impl KeyingDecision {
    /// Inclusive per-channel window test
    #[must_use]
    pub fn is_background(&self, pixel: &Rgba<u8>) -> bool {
        let tol = i16::from(self.tolerance);
        self.reference
            .iter()
            .zip(pixel.0.iter())
            .all(|(&reference, &channel)| {
                let reference = i16::from(reference);
                let channel = i16::from(channel);
                channel >= reference - tol && channel <= reference + tol
            })
    }
}

/// Decide reference color and tolerance, or `None` when the image is already keyed
///
/// An image counts as pre-keyed when its top-left pixel is not fully opaque.
#[must_use]
pub fn keying_decision(image: &RgbaImage, config: &KeyingConfig) -> Option<KeyingDecision> {
    let corner = image.get_pixel_checked(0, 0)?;
    if corner[3] < 255 {
        return None;
    }

    let reference = config
        .background_override
        .map_or([corner[0], corner[1], corner[2]], |color| color.rgb());

    Some(KeyingDecision {
        reference,
        tolerance: config.tolerance_for(reference),
    })
}

/// Make the corner-colored background transparent
///
/// RGB values are left untouched; only the alpha of background pixels is set to 0.
/// Images whose corner pixel is already translucent are returned unchanged, which
/// makes the keyer idempotent on its own output.
#[must_use]
pub fn key_out_background(image: &RgbaImage, config: &KeyingConfig) -> RgbaImage {
    let mut keyed = image.clone();

    let Some(decision) = keying_decision(image, config) else {
        debug!("corner pixel already transparent, skipping keying");
        return keyed;
    };

    debug!(
        reference = ?decision.reference,
        tolerance = decision.tolerance,
        "keying background"
    );

    let mut keyed_pixels = 0usize;
    for pixel in keyed.pixels_mut() {
        if decision.is_background(pixel) {
            pixel[3] = 0;
            keyed_pixels += 1;
        }
    }

    debug!(
        keyed_pixels,
        total_pixels = image.as_raw().len() / 4,
        "background keyed"
    );

    keyed
}

/// Key out every pixel whose RGB channels are all at or above `threshold`
///
/// Keyed pixels become `(255, 255, 255, 0)`. Used for logos on white that carry
/// anti-aliased grey text where the corner heuristic is too aggressive.
#[must_use]
pub fn key_out_near_white(image: &RgbaImage, threshold: u8) -> RgbaImage {
    let mut keyed = image.clone();
    for pixel in keyed.pixels_mut() {
        if pixel.0[..3].iter().all(|&c| c >= threshold) {
            *pixel = Rgba([255, 255, 255, 0]);
        }
    }
    keyed
}

/// Most frequent RGB among the four corners
///
/// Corners are read top-left, top-right, bottom-left, bottom-right; ties go to
/// the earliest. Returns `None` for an empty image.
#[must_use]
pub fn majority_corner_color(image: &RgbaImage) -> Option<[u8; 3]> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return None;
    }

    let corners: Vec<[u8; 3]> = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)]
        .iter()
        .map(|&(x, y)| {
            let [r, g, b, _] = image.get_pixel(x, y).0;
            [r, g, b]
        })
        .collect();

    let mut best: Option<([u8; 3], usize)> = None;
    for color in &corners {
        let count = corners.iter().filter(|c| *c == color).count();
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((*color, count));
        }
    }
    best.map(|(color, _)| color)
}

/// Key pixels close to the majority corner color
///
/// A pixel is background when the sum of absolute channel differences to the
/// reference is strictly below `threshold`. RGB is kept and alpha set to 0.
/// Suited to artwork where one corner is covered by content.
#[must_use]
pub fn key_out_corner_majority(image: &RgbaImage, threshold: u16) -> RgbaImage {
    let mut keyed = image.clone();
    let Some(reference) = majority_corner_color(image) else {
        return keyed;
    };
    debug!(reference = ?reference, threshold, "keying by majority corner color");

    for pixel in keyed.pixels_mut() {
        let distance: u16 = reference
            .iter()
            .zip(pixel.0.iter())
            .map(|(&r, &c)| u16::from(r.abs_diff(c)))
            .sum();
        if distance < threshold {
            pixel[3] = 0;
        }
    }
    keyed
}
