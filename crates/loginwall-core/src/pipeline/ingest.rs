//! Ingest orchestration - wires decode, hash, normalize and store together.

use std::time::Instant;

use crate::config::Config;
use crate::error::{IngestError, IngestResult};
use crate::store::ContentStore;
use crate::types::{ContentDigest, IngestOutcome, SourceFormat, UploadRequest};

use super::decode::{DecodedImage, HashedDecode, ImageDecoder};
use super::normalize::CanonicalEncoder;

/// Runs one upload through decode+hash and commits the canonical object.
///
/// Stateless apart from the shared store; one instance serves every request.
#[derive(Debug, Clone)]
pub struct Ingestor {
    decoder: ImageDecoder,
    encoder: CanonicalEncoder,
    store: ContentStore,
}

impl Ingestor {
    /// Create an ingestor that always writes alpha-carrying PNGs into `store`.
    pub fn new(config: &Config, store: ContentStore) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            encoder: CanonicalEncoder::new(true),
            store,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Decode and hash the upload in one pass, then commit it.
    ///
    /// On any error nothing is written. The digest of an undecodable upload
    /// is computed but discarded.
    pub async fn ingest(&self, upload: UploadRequest) -> IngestResult<IngestOutcome> {
        let format = SourceFormat::from_content_type(&upload.content_type).ok_or_else(|| {
            IngestError::UnsupportedFormat {
                content_type: upload.content_type.clone(),
            }
        })?;

        let hash_start = Instant::now();
        let HashedDecode { digest, decoded } =
            self.decoder.decode_hashed(format, upload.body).await?;
        let decoded = decoded.inspect_err(|e| {
            tracing::debug!(%digest, "Discarding digest of rejected upload: {}", e);
        })?;
        tracing::debug!(
            %digest,
            %format,
            "Hash+decode took {:?} ({}x{})",
            hash_start.elapsed(),
            decoded.width,
            decoded.height
        );

        self.commit(digest, decoded).await
    }

    async fn commit(
        &self,
        digest: ContentDigest,
        decoded: DecodedImage,
    ) -> IngestResult<IngestOutcome> {
        let (width, height) = (decoded.width, decoded.height);

        // Same raw bytes were ingested before; skip the encode entirely.
        if self
            .store
            .contains(&digest)
            .await
            .map_err(IngestError::StoreWrite)?
        {
            tracing::debug!(%digest, "Object already stored, skipping encode");
            return Ok(IngestOutcome {
                digest,
                name: digest.object_name(),
                written: false,
                width,
                height,
            });
        }

        let encode_start = Instant::now();
        let encoder = self.encoder;
        let encoded = tokio::task::spawn_blocking(move || encoder.encode(&decoded.image))
            .await
            .map_err(|e| IngestError::Encode(format!("Task join error: {}", e)))??;
        tracing::debug!(
            %digest,
            "PNG encode took {:?} ({} bytes)",
            encode_start.elapsed(),
            encoded.len()
        );

        let put = self
            .store
            .put(&digest, encoded)
            .await
            .map_err(IngestError::StoreWrite)?;

        Ok(IngestOutcome {
            digest,
            name: put.name,
            written: put.written,
            width,
            height,
        })
    }
}
