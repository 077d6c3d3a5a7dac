//! Dark-mode variant derivation

use image::{GrayImage, Rgba, RgbaImage};

/// Extract the alpha channel as a grayscale mask
#[must_use]
pub fn alpha_mask(image: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([image.get_pixel(x, y)[3]])
    })
}

/// Solid white fill in the silhouette of `image`
///
/// The alpha channel is copied unchanged, so anti-aliased edges stay smooth.
/// Fully transparent pixels are left as `(0, 0, 0, 0)`.
#[must_use]
pub fn derive_dark_variant(image: &RgbaImage) -> RgbaImage {
    let mask = alpha_mask(image);
    let mut white_logo = RgbaImage::new(image.width(), image.height());

    for (pixel, alpha) in white_logo.pixels_mut().zip(mask.pixels()) {
        let alpha = alpha[0];
        if alpha > 0 {
            *pixel = Rgba([255, 255, 255, alpha]);
        }
    }

    white_logo
}
