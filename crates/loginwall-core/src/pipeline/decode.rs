//! Image decoding with concurrent content hashing, validation, and timeout support.

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::{BufReader, Cursor};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::{IngestError, IngestResult};
use crate::types::{ContentDigest, SourceFormat};

use super::hash::HashingReader;

/// Image decoder with configurable limits and timeout.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Encoding the bytes were decoded as
    pub format: SourceFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Raw upload size in bytes
    pub file_size: u64,
}

/// Output of one hash-while-decode pass.
///
/// The digest is available even when decoding failed; the caller decides
/// what to do with it.
pub struct HashedDecode {
    pub digest: ContentDigest,
    pub decoded: IngestResult<DecodedImage>,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode upload bytes as `format` while hashing them in the same pass.
    ///
    /// Runs on the blocking pool under the configured decode timeout. The
    /// outer error covers failures that prevent a digest from being produced
    /// at all (timeout, panicked task); decode failures land in
    /// [`HashedDecode::decoded`].
    pub async fn decode_hashed(
        &self,
        format: SourceFormat,
        bytes: Bytes,
    ) -> IngestResult<HashedDecode> {
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_hashed_sync(format, bytes)).await
        })
        .await;

        let mut output = match decode_result {
            Ok(Ok(output)) => output?,
            Ok(Err(e)) => {
                return Err(IngestError::Decode {
                    format: format.as_str(),
                    message: format!("Task join error: {}", e),
                })
            }
            Err(_) => {
                return Err(IngestError::Timeout {
                    stage: "decode",
                    timeout_ms: self.limits.decode_timeout_ms,
                })
            }
        };

        if let Ok(decoded) = &output.decoded {
            let max_dim = self.limits.max_image_dimension;
            if decoded.width > max_dim || decoded.height > max_dim {
                output.decoded = Err(IngestError::ImageTooLarge {
                    width: decoded.width,
                    height: decoded.height,
                    max_dim,
                });
            }
        }
        Ok(output)
    }

    /// Synchronous hash-while-decode (runs in spawn_blocking).
    ///
    /// The decoder reads through a [`HashingReader`]; whatever it leaves
    /// unread is drained into the digest afterwards.
    pub fn decode_hashed_sync(format: SourceFormat, bytes: Bytes) -> IngestResult<HashedDecode> {
        let file_size = bytes.len() as u64;
        let mut tee = HashingReader::new(Cursor::new(bytes));

        let decoded = ImageReader::with_format(BufReader::new(&mut tee), format.image_format())
            .decode()
            .map(|image| {
                let (width, height) = image.dimensions();
                DecodedImage {
                    image,
                    format,
                    width,
                    height,
                    file_size,
                }
            })
            .map_err(|e| IngestError::Decode {
                format: format.as_str(),
                message: e.to_string(),
            });

        let digest = tee.finish().map_err(|e| IngestError::Decode {
            format: format.as_str(),
            message: format!("Cannot read upload: {}", e),
        })?;

        Ok(HashedDecode { digest, decoded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::{jpeg_bytes, opaque_png_bytes};

    #[test]
    fn test_png_decodes_and_hashes_whole_input() {
        let bytes = opaque_png_bytes(40, 30);
        let output = ImageDecoder::decode_hashed_sync(SourceFormat::Png, bytes.clone()).unwrap();

        assert_eq!(output.digest, ContentDigest::of(&bytes));
        let decoded = output.decoded.unwrap();
        assert_eq!((decoded.width, decoded.height), (40, 30));
        assert_eq!(decoded.format, SourceFormat::Png);
        assert_eq!(decoded.file_size, bytes.len() as u64);
    }

    #[test]
    fn test_jpeg_decodes() {
        let bytes = jpeg_bytes(64, 48);
        let output = ImageDecoder::decode_hashed_sync(SourceFormat::Jpeg, bytes.clone()).unwrap();
        assert_eq!(output.digest, ContentDigest::of(&bytes));
        let decoded = output.decoded.unwrap();
        assert_eq!((decoded.width, decoded.height), (64, 48));
    }

    #[test]
    fn test_trailing_bytes_are_part_of_digest() {
        let clean = opaque_png_bytes(8, 8);
        let mut padded = clean.to_vec();
        padded.extend_from_slice(b"trailing junk after IEND");
        let padded = Bytes::from(padded);

        let a = ImageDecoder::decode_hashed_sync(SourceFormat::Png, clean).unwrap();
        let b = ImageDecoder::decode_hashed_sync(SourceFormat::Png, padded.clone()).unwrap();
        assert!(a.decoded.is_ok());
        assert!(b.decoded.is_ok());
        assert_ne!(a.digest, b.digest);
        assert_eq!(b.digest, ContentDigest::of(&padded));
    }

    #[test]
    fn test_truncated_png_fails_but_still_hashes() {
        let bytes = opaque_png_bytes(50, 50);
        let truncated = bytes.slice(..bytes.len() / 2);
        let output =
            ImageDecoder::decode_hashed_sync(SourceFormat::Png, truncated.clone()).unwrap();

        assert_eq!(output.digest, ContentDigest::of(&truncated));
        assert!(matches!(output.decoded, Err(IngestError::Decode { format: "png", .. })));
    }

    #[test]
    fn test_declared_format_is_enforced() {
        // PNG bytes declared as JPEG must not be sniffed into a PNG decode
        let bytes = opaque_png_bytes(8, 8);
        let output = ImageDecoder::decode_hashed_sync(SourceFormat::Jpeg, bytes).unwrap();
        assert!(matches!(output.decoded, Err(IngestError::Decode { format: "jpeg", .. })));
    }

    #[tokio::test]
    async fn test_dimension_limit() {
        let decoder = ImageDecoder::new(LimitsConfig {
            max_image_dimension: 16,
            ..LimitsConfig::default()
        });
        let output = decoder
            .decode_hashed(SourceFormat::Png, opaque_png_bytes(32, 8))
            .await
            .unwrap();
        assert!(matches!(
            output.decoded,
            Err(IngestError::ImageTooLarge { width: 32, height: 8, max_dim: 16 })
        ));
    }

    #[tokio::test]
    async fn test_decode_hashed_async() {
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let bytes = opaque_png_bytes(10, 10);
        let output = decoder
            .decode_hashed(SourceFormat::Png, bytes.clone())
            .await
            .unwrap();
        assert_eq!(output.digest, ContentDigest::of(&bytes));
        assert!(output.decoded.is_ok());
    }
}
