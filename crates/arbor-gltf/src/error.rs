//! Error types for glTF export and import.

use thiserror::Error;

/// Result type for glTF operations.
pub type Result<T> = std::result::Result<T, GltfError>;

/// Errors that can occur while assembling or reading a glTF asset.
#[derive(Debug, Error)]
pub enum GltfError {
    /// Invalid data in an input document.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Missing required data.
    #[error("missing required: {0}")]
    MissingRequired(String),

    /// Unsupported feature or version.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Geometry compression failure.
    #[error("draco error: {0}")]
    Draco(String),

    /// I/O error (texture files are the only file access in the pipeline).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Image encoding/decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
