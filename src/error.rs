//! Error types for bindery operations.

use thiserror::Error;

/// Errors that can occur while validating input or encoding a book.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Every structural defect found in the input, collected before any
    /// encoder runs.
    #[error("JSON validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An encoder failed mid-run; no partial output is produced.
    #[error("Conversion failed: {0}")]
    Conversion(String),
}

pub type Result<T> = std::result::Result<T, Error>;
