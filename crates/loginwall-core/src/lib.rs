//! Loginwall Core - ingest pipeline and content-addressed store for
//! login-window wallpapers.
//!
//! An upload is decoded and hashed in a single pass over its bytes,
//! normalized to RGBA, re-encoded as a PNG that always carries an alpha
//! channel, and written once under the digest of the raw upload:
//!
//! ```text
//! bytes ─┬─> BLAKE3 ──────────────> digest ─┐
//!        └─> decode ─> RGBA ─> PNG ─────────┴─> <store>/<hex>.png
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use loginwall_core::{Config, ContentStore, Ingestor, UploadRequest};
//!
//! #[tokio::main]
//! async fn main() -> loginwall_core::Result<()> {
//!     let config = Config::load()?;
//!     let store = ContentStore::open(config.storage_dir()).await?;
//!     let ingestor = Ingestor::new(&config, store);
//!
//!     let bytes = std::fs::read("wallpaper.jpg")?;
//!     let outcome = ingestor.ingest(UploadRequest::new("image/jpeg", bytes)).await?;
//!     println!("Stored as {}", outcome.name);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, IngestError, IngestResult, LoginwallError, Result, StoreError};
pub use pipeline::{CanonicalEncoder, ImageDecoder, Ingestor};
pub use store::{ContentStore, PutOutcome, StoredObject};
pub use types::{
    ContentDigest, IngestOutcome, IngestStage, PublicReference, SourceFormat, UploadRequest,
    CANONICAL_EXTENSION, CANONICAL_MIME,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
