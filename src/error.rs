//! Error types for logo normalization

use std::path::Path;
use thiserror::Error;

/// Result type alias for logo normalization operations
pub type Result<T> = std::result::Result<T, LogoError>;

/// Error types for logo normalization operations
#[derive(Error, Debug)]
pub enum LogoError {
    /// Input/output errors (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors surfaced directly by the image crate
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Input file does not exist
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Input exists but could not be read
    #[error("Read error: {0}")]
    Read(String),

    /// Input could not be decoded as a supported raster format
    #[error("Decode error: {0}")]
    Decode(String),

    /// Output could not be encoded or written
    #[error("Encode error: {0}")]
    Encode(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unsupported file format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Asset manifest could not be read or parsed
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Pixel pipeline errors
    #[error("Processing error: {0}")]
    Processing(String),
}

impl LogoError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new manifest error
    pub fn manifest<S: Into<String>>(msg: S) -> Self {
        Self::Manifest(msg.into())
    }

    /// Input path that does not exist
    pub fn missing_input<P: AsRef<Path>>(path: P) -> Self {
        Self::MissingInput(format!("file not found: '{}'", path.as_ref().display()))
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            error.kind(),
            format!(
                "Failed to {} '{}': {}",
                operation,
                path.as_ref().display(),
                error
            ),
        ))
    }

    /// Input-side I/O failure, kept apart from `Io` which covers output writes
    pub fn read_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        Self::Read(format!(
            "Failed to {} '{}': {}",
            operation,
            path.as_ref().display(),
            error
        ))
    }

    /// Create decode error with format context
    pub fn decode_error<P: AsRef<Path>>(path: P, details: &str) -> Self {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown");

        Self::Decode(format!(
            "Failed to decode '{}' (extension: {}): {}. Supported formats: PNG, JPEG, WebP",
            path.display(),
            extension,
            details
        ))
    }

    /// Create encode error for an output path
    pub fn encode_error<P: AsRef<Path>>(path: P, details: &str) -> Self {
        Self::Encode(format!(
            "Failed to write PNG '{}': {}",
            path.as_ref().display(),
            details
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Create processing error with stage context
    pub fn processing_stage_error(stage: &str, details: &str, input_info: Option<&str>) -> Self {
        let input_context = match input_info {
            Some(info) => format!(" (input: {})", info),
            None => String::new(),
        };

        Self::Processing(format!(
            "Processing failed at stage '{}'{}: {}",
            stage, input_context, details
        ))
    }
}
