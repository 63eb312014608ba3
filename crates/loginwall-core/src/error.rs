//! Error types for the loginwall ingest pipeline and object store.
//!
//! Errors are organized by stage so the HTTP layer can tell a client problem
//! (bad upload, missing object) apart from a transient storage failure.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::IngestStage;

/// Top-level error type for loginwall operations.
#[derive(Error, Debug)]
pub enum LoginwallError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Upload ingestion errors
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Object store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures of a single upload, from body receipt through commit.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Request body exceeded the upload ceiling
    #[error("Upload too large: limit is {limit} bytes")]
    SizeLimitExceeded { limit: u64 },

    /// Bad multipart structure or missing upload field
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Declared content type is not one of the supported encodings
    #[error("Unrecognized image format: {content_type}")]
    UnsupportedFormat { content_type: String },

    /// Bytes are not a valid image of the declared encoding
    #[error("Decode error ({format}): {message}")]
    Decode {
        format: &'static str,
        message: String,
    },

    /// Decoded image dimensions exceed limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge {
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// A pipeline stage did not finish in time
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout {
        stage: &'static str,
        timeout_ms: u64,
    },

    /// Canonical re-encoding failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Persisting the canonical object failed
    #[error("Failed to store object: {0}")]
    StoreWrite(#[source] StoreError),
}

impl IngestError {
    /// Stage of the upload transaction this error ends.
    pub fn stage(&self) -> IngestStage {
        match self {
            Self::SizeLimitExceeded { .. } => IngestStage::ReceivingBody,
            Self::MalformedRequest(_) => IngestStage::Parsing,
            Self::UnsupportedFormat { .. }
            | Self::Decode { .. }
            | Self::ImageTooLarge { .. }
            | Self::Timeout { .. } => IngestStage::DecodingHashing,
            Self::Encode(_) | Self::StoreWrite(_) => IngestStage::Committing,
        }
    }
}

/// Content-addressable store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No object exists under this name
    #[error("Object not found: {0}")]
    NotFound(String),

    /// I/O failure touching the backing directory
    #[error("Store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the object is absent rather than unreadable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Convenience type alias for loginwall results.
pub type Result<T> = std::result::Result<T, LoginwallError>;

/// Convenience type alias for ingest results.
pub type IngestResult<T> = std::result::Result<T, IngestError>;
