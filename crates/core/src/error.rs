//! Error types for the vellum comparison engine.

use thiserror::Error;

/// Primary error type for document comparison operations.
#[derive(Error, Debug)]
pub enum VellumError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("invalid document {path}: {msg}")]
    InvalidDocument { path: String, msg: String },

    #[error("page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("render error: {0}")]
    Render(String),

    #[error("unknown page handle: {0}")]
    UnknownPage(usize),

    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

/// Convenience Result type alias for VellumError.
pub type Result<T> = std::result::Result<T, VellumError>;
