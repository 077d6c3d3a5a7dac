//! Canvas fitting
//!
//! Scales content uniformly into the padded interior of a fixed-size
//! transparent canvas and centers it.

use crate::{
    config::CanvasConfig,
    error::{LogoError, Result},
};
use image::{imageops, ImageBuffer, Rgba, RgbaImage};
use tracing::debug;

type Rgba32FImage = ImageBuffer<Rgba<f32>, Vec<f32>>;

/// Placement of scaled content on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitGeometry {
    /// Uniform scale factor applied to both axes
    pub scale: f64,
    /// Scaled content width
    pub width: u32,
    /// Scaled content height
    pub height: u32,
    /// Left edge of the content on the canvas
    pub offset_x: u32,
    /// Top edge of the content on the canvas
    pub offset_y: u32,
}

/// Compute scaled size and centering offset for a `width x height` image
///
/// The scaled size is `floor(scale * original)` where
/// `scale = min(interior_w / width, interior_h / height)`. It is evaluated in
/// exact integer arithmetic so the tighter axis lands exactly on the interior size.
///
/// # Errors
/// - Source image with a zero dimension
/// - Invalid canvas (see `CanvasConfig::validate`)
pub fn fit_dimensions(width: u32, height: u32, canvas: &CanvasConfig) -> Result<FitGeometry> {
    canvas.validate()?;
    if width == 0 || height == 0 {
        return Err(LogoError::processing_stage_error(
            "canvas fitting",
            "source image has no pixels",
            Some(&format!("{}x{}", width, height)),
        ));
    }

    let (avail_w, avail_h) = canvas.content_area();
    let (w, h) = (u64::from(width), u64::from(height));
    let (aw, ah) = (u64::from(avail_w), u64::from(avail_h));

    let (new_w, new_h, scale) = if aw * h <= ah * w {
        (aw, h * aw / w, aw as f64 / w as f64)
    } else {
        (w * ah / h, ah, ah as f64 / h as f64)
    };

    // Extremely thin sources would otherwise collapse to zero pixels
    let new_w = new_w.max(1) as u32;
    let new_h = new_h.max(1) as u32;

    Ok(FitGeometry {
        scale,
        width: new_w,
        height: new_h,
        offset_x: (canvas.width - new_w) / 2,
        offset_y: (canvas.height - new_h) / 2,
    })
}

/// Scale `image` into the canvas interior and center it on a transparent canvas
///
/// # Errors
/// - Source image with a zero dimension
/// - Invalid canvas configuration
pub fn fit_to_canvas(image: &RgbaImage, canvas: &CanvasConfig) -> Result<RgbaImage> {
    fit_to_canvas_with_geometry(image, canvas).map(|(fitted, _)| fitted)
}

/// Same as [`fit_to_canvas`] but also returns the placement used
///
/// # Errors
/// See [`fit_to_canvas`].
pub fn fit_to_canvas_with_geometry(
    image: &RgbaImage,
    canvas: &CanvasConfig,
) -> Result<(RgbaImage, FitGeometry)> {
    let geometry = fit_dimensions(image.width(), image.height(), canvas)?;

    debug!(
        source_width = image.width(),
        source_height = image.height(),
        scaled_width = geometry.width,
        scaled_height = geometry.height,
        offset_x = geometry.offset_x,
        offset_y = geometry.offset_y,
        scale = geometry.scale,
        "fitting to canvas"
    );

    let scaled = resize_premultiplied(image, geometry.width, geometry.height);

    let mut output = RgbaImage::new(canvas.width, canvas.height);
    paste_with_alpha_mask(&mut output, &scaled, geometry.offset_x, geometry.offset_y);

    Ok((output, geometry))
}

/// Lanczos3 resize with premultiplied alpha
///
/// Resampling straight RGBA lets the RGB of invisible keyed pixels bleed into
/// edges, so color is weighted by alpha while filtering.
fn resize_premultiplied(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }

    let premultiplied: Rgba32FImage = ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = f32::from(a) / 255.0;
        Rgba([
            f32::from(r) / 255.0 * alpha,
            f32::from(g) / 255.0 * alpha,
            f32::from(b) / 255.0 * alpha,
            alpha,
        ])
    });

    let resized = imageops::resize(&premultiplied, width, height, imageops::FilterType::Lanczos3);

    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = resized.get_pixel(x, y).0;
        let alpha = to_byte(a);
        if alpha == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        let a = a.clamp(f32::EPSILON, 1.0);
        Rgba([to_byte(r / a), to_byte(g / a), to_byte(b / a), alpha])
    })
}

/// Rounded `v / 255` for `v <= 255 * 255`
fn div255(v: u32) -> u8 {
    let t = v + 128;
    (((t >> 8) + t) >> 8) as u8
}

/// Paste `top` onto `bottom` at `(x, y)` using `top`'s own alpha as the blend mask
///
/// Every channel, alpha included, becomes `src * a + dst * (255 - a)` over 255
/// where `a` is the source alpha. On a transparent canvas an edge pixel of alpha
/// `a` therefore lands with alpha `a * a / 255` and its color scaled by `a / 255`.
/// Pixels of `top` falling outside `bottom` are ignored.
pub fn paste_with_alpha_mask(bottom: &mut RgbaImage, top: &RgbaImage, x: u32, y: u32) {
    for (tx, ty, src) in top.enumerate_pixels() {
        let (bx, by) = (x + tx, y + ty);
        if bx >= bottom.width() || by >= bottom.height() {
            continue;
        }

        let mask = u32::from(src[3]);
        let dst = bottom.get_pixel_mut(bx, by);
        for (out, &value) in dst.0.iter_mut().zip(src.0.iter()) {
            *out = div255(u32::from(*out) * (255 - mask) + u32::from(value) * mask);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasPreset;

    #[test]
    fn test_wide_source_geometry() {
        let canvas = CanvasPreset::Card.canvas();
        let geometry = fit_dimensions(800, 200, &canvas).unwrap();

        assert_eq!((geometry.width, geometry.height), (394, 98));
        assert_eq!((geometry.offset_x, geometry.offset_y), (3, 51));
        assert!((geometry.scale - 0.4925).abs() < 1e-9);
    }

    #[test]
    fn test_tall_source_geometry() {
        let canvas = CanvasPreset::Strip.canvas();
        let geometry = fit_dimensions(100, 400, &canvas).unwrap();

        // Height is the tight axis: 74 / 400
        assert_eq!(geometry.height, 74);
        assert_eq!(geometry.width, 18);
        assert_eq!(geometry.offset_y, 3);
        assert_eq!(geometry.offset_x, 91);
    }

    #[test]
    fn test_small_source_is_upscaled() {
        let canvas = CanvasConfig {
            width: 100,
            height: 100,
            padding: 0,
        };
        let geometry = fit_dimensions(10, 10, &canvas).unwrap();
        assert_eq!((geometry.width, geometry.height), (100, 100));
        assert_eq!((geometry.offset_x, geometry.offset_y), (0, 0));
    }

    #[test]
    fn test_odd_remainder_floors_offset() {
        let canvas = CanvasConfig {
            width: 11,
            height: 10,
            padding: 0,
        };
        let geometry = fit_dimensions(4, 10, &canvas).unwrap();
        assert_eq!(geometry.width, 4);
        assert_eq!(geometry.offset_x, 3);
    }

    #[test]
    fn test_thin_source_keeps_one_pixel() {
        let canvas = CanvasPreset::Strip.canvas();
        let geometry = fit_dimensions(10_000, 1, &canvas).unwrap();
        assert_eq!(geometry.width, 194);
        assert_eq!(geometry.height, 1);
    }

    #[test]
    fn test_zero_sized_source_is_rejected() {
        let canvas = CanvasPreset::Strip.canvas();
        assert!(fit_dimensions(0, 10, &canvas).is_err());
        assert!(fit_to_canvas(&RgbaImage::new(0, 0), &canvas).is_err());
    }

    #[test]
    fn test_output_is_canvas_sized() {
        let canvas = CanvasPreset::Card.canvas();
        for (w, h) in [(1, 1), (37, 900), (800, 200), (2000, 1000)] {
            let image = RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255]));
            let fitted = fit_to_canvas(&image, &canvas).unwrap();
            assert_eq!(fitted.dimensions(), (400, 200));
        }
    }

    #[test]
    fn test_content_is_centered_within_padding() {
        let canvas = CanvasPreset::Card.canvas();
        let image = RgbaImage::from_pixel(800, 200, Rgba([0, 0, 0, 255]));
        let fitted = fit_to_canvas(&image, &canvas).unwrap();

        // Margins are transparent
        assert_eq!(fitted.get_pixel(2, 100)[3], 0);
        assert_eq!(fitted.get_pixel(397, 100)[3], 0);
        assert_eq!(fitted.get_pixel(200, 50)[3], 0);
        assert_eq!(fitted.get_pixel(200, 149)[3], 0);
        // Interior is opaque black
        assert_eq!(*fitted.get_pixel(200, 100), Rgba([0, 0, 0, 255]));
        assert_eq!(fitted.get_pixel(3, 51)[3], 255);
        assert_eq!(fitted.get_pixel(396, 148)[3], 255);
    }

    #[test]
    fn test_transparent_keyed_pixels_do_not_bleed() {
        // Red content next to invisible white; the resized edge must stay red
        let image = RgbaImage::from_fn(40, 40, |x, _| {
            if x < 20 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 0])
            }
        });
        let canvas = CanvasConfig {
            width: 23,
            height: 23,
            padding: 0,
        };
        let fitted = fit_to_canvas(&image, &canvas).unwrap();
        for pixel in fitted.pixels().filter(|p| p[3] > 16) {
            assert!(pixel[1] < 40 && pixel[2] < 40, "edge bled: {:?}", pixel);
        }
    }

    #[test]
    fn test_paste_scales_translucent_edges_by_their_alpha() {
        let mut bottom = RgbaImage::new(4, 4);
        let top = RgbaImage::from_pixel(2, 2, Rgba([10, 200, 30, 77]));
        paste_with_alpha_mask(&mut bottom, &top, 1, 1);

        assert_eq!(*bottom.get_pixel(1, 1), Rgba([3, 60, 9, 23]));
        assert_eq!(*bottom.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*bottom.get_pixel(3, 3), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_fit_without_resize_uses_mask_blending() {
        let image = RgbaImage::from_pixel(10, 10, Rgba([10, 200, 30, 77]));
        let canvas = CanvasConfig {
            width: 10,
            height: 10,
            padding: 0,
        };
        let fitted = fit_to_canvas(&image, &canvas).unwrap();
        assert!(fitted.pixels().all(|p| *p == Rgba([3, 60, 9, 23])));
    }

    #[test]
    fn test_paste_keeps_opaque_pixels_and_blends_partial_ones() {
        let mut bottom = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        let mut top = RgbaImage::new(2, 1);
        top.put_pixel(0, 0, Rgba([12, 34, 56, 255]));
        top.put_pixel(1, 0, Rgba([255, 255, 255, 128]));
        paste_with_alpha_mask(&mut bottom, &top, 0, 0);

        assert_eq!(*bottom.get_pixel(0, 0), Rgba([12, 34, 56, 255]));
        let blended = bottom.get_pixel(1, 0);
        assert_eq!(blended[0], 128);
        assert_eq!(blended[3], 191);
    }

    #[test]
    fn test_paste_clips_out_of_bounds() {
        let mut bottom = RgbaImage::new(2, 2);
        let top = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 255]));
        paste_with_alpha_mask(&mut bottom, &top, 1, 1);
        assert_eq!(*bottom.get_pixel(1, 1), Rgba([1, 2, 3, 255]));
        assert_eq!(bottom.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_fitted_light_and_dark_alpha_agree() {
        let source =
            RgbaImage::from_fn(30, 12, |x, y| Rgba([200, 40, 10, (x * 8 + y) as u8]));
        let dark = crate::dark_variant::derive_dark_variant(&source);
        let canvas = CanvasPreset::Strip.canvas();

        let light_fit = fit_to_canvas(&source, &canvas).unwrap();
        let dark_fit = fit_to_canvas(&dark, &canvas).unwrap();
        let alpha = |img: &RgbaImage| img.pixels().map(|p| p[3]).collect::<Vec<_>>();
        assert_eq!(alpha(&light_fit), alpha(&dark_fit));
    }
}
