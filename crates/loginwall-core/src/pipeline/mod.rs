//! Upload ingest pipeline components.
//!
//! - **decode**: Decode JPEG/PNG uploads with limits and timeout
//! - **hash**: BLAKE3 tee that hashes the bytes the decoder reads
//! - **normalize**: RGBA normalization and canonical PNG encoding
//! - **ingest**: Orchestrates decode+hash and the store commit

pub mod decode;
pub mod hash;
pub mod ingest;
pub mod normalize;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-exports for convenient access
pub use decode::{DecodedImage, HashedDecode, ImageDecoder};
pub use hash::HashingReader;
pub use ingest::Ingestor;
pub use normalize::{normalize, CanonicalEncoder};
