//! Image I/O operations service
//!
//! Separates file I/O from the pixel pipeline so the pipeline stays pure and
//! the file handling can be tested on its own.

use crate::{
    config::PngCompression,
    error::{LogoError, Result},
};
use image::{
    codecs::png::{FilterType, PngEncoder},
    DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage,
};
use std::path::Path;

/// Service for handling logo file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load a raster image from a file path
    ///
    /// Format is taken from the extension first and sniffed from content when
    /// that fails, so a mislabeled `.png` that is really a JPEG still loads.
    ///
    /// # Errors
    /// - `LogoError::MissingInput` when the file does not exist
    /// - `LogoError::Decode` when neither detection method can decode it
    ///
    /// # Examples
    /// ```rust,no_run
    /// use logo_normalize::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("logos/acme.png")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.is_file() {
            return Err(LogoError::missing_input(path_ref));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref)
                    .map_err(|io_err| LogoError::read_error("read image data", path_ref, &io_err))?;

                image::load_from_memory(&data).map_err(|content_err| {
                    LogoError::decode_error(
                        path_ref,
                        &format!(
                            "{} (content-based detection: {}, {} bytes)",
                            e,
                            content_err,
                            data.len()
                        ),
                    )
                })
            },
        }
    }

    /// Encode an RGBA image as PNG bytes
    ///
    /// Output carries no timestamps or text chunks, so identical pixels give
    /// identical bytes.
    ///
    /// # Errors
    /// Returns `LogoError::Image` if the encoder rejects the buffer.
    pub fn encode_png(image: &RgbaImage, compression: PngCompression) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let encoder = PngEncoder::new_with_quality(
            &mut bytes,
            compression.to_image_compression(),
            FilterType::Adaptive,
        );
        encoder.write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(bytes)
    }

    /// Write an RGBA image to `path` as PNG, creating parent directories
    ///
    /// Existing files are overwritten.
    ///
    /// # Errors
    /// - `LogoError::Io` when the directory cannot be created
    /// - `LogoError::Encode` when encoding or writing fails
    pub fn save_png<P: AsRef<Path>>(
        image: &RgbaImage,
        path: P,
        compression: PngCompression,
    ) -> Result<()> {
        let path_ref = path.as_ref();
        Self::ensure_parent(path_ref)?;

        let bytes = Self::encode_png(image, compression)
            .map_err(|e| LogoError::encode_error(path_ref, &e.to_string()))?;
        std::fs::write(path_ref, bytes)
            .map_err(|e| LogoError::encode_error(path_ref, &e.to_string()))?;

        log::debug!(
            "Wrote {}x{} PNG to {}",
            image.width(),
            image.height(),
            path_ref.display()
        );
        Ok(())
    }

    /// Copy a file byte-for-byte, creating parent directories
    ///
    /// # Errors
    /// - `LogoError::MissingInput` when `from` does not exist
    /// - `LogoError::Io` when the copy fails
    pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> Result<u64> {
        let (from, to) = (from.as_ref(), to.as_ref());
        if !from.is_file() {
            return Err(LogoError::missing_input(from));
        }
        Self::ensure_parent(to)?;

        std::fs::copy(from, to).map_err(|e| LogoError::file_io_error("copy file", to, &e))
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| LogoError::file_io_error("create output directory", parent, &e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(12, 7, |x, y| Rgba([x as u8 * 20, y as u8 * 30, 90, 200]))
    }

    #[test]
    fn test_missing_input() {
        let result = ImageIOService::load_image("/no/such/logo.png");
        assert!(matches!(result, Err(LogoError::MissingInput(_))));
    }

    #[test]
    fn test_undecodable_input() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let result = ImageIOService::load_image(&path);
        assert!(matches!(result, Err(LogoError::Decode(_))));
    }

    #[test]
    fn test_save_and_reload_is_lossless() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/logo.png");
        let image = sample();

        ImageIOService::save_png(&image, &path, PngCompression::Best).unwrap();
        let loaded = ImageIOService::load_image(&path).unwrap().to_rgba8();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_mislabeled_file_falls_back_to_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("actually-png.jpg");
        let bytes = ImageIOService::encode_png(&sample(), PngCompression::Fast).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let loaded = ImageIOService::load_image(&path).unwrap();
        assert_eq!(loaded.width(), 12);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let first = ImageIOService::encode_png(&sample(), PngCompression::Fast).unwrap();
        let second = ImageIOService::encode_png(&sample(), PngCompression::Fast).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_copy_file() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("logo.svg");
        let to = temp_dir.path().join("out/acme.svg");
        std::fs::write(&from, b"<svg/>").unwrap();

        let copied = ImageIOService::copy_file(&from, &to).unwrap();
        assert_eq!(copied, 6);
        assert_eq!(std::fs::read(&to).unwrap(), b"<svg/>");

        let missing = ImageIOService::copy_file(temp_dir.path().join("nope.svg"), &to);
        assert!(matches!(missing, Err(LogoError::MissingInput(_))));
    }
}
