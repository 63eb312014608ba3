//! Core data types shared by the ingest pipeline, the store and the HTTP layer.

use bytes::Bytes;
use image::ImageFormat;
use std::fmt;
use url::Url;

use crate::config::ServerConfig;

/// File extension of the canonical encoding. Every stored object is a PNG.
pub const CANONICAL_EXTENSION: &str = "png";

/// Media type served for stored objects.
pub const CANONICAL_MIME: &str = "image/png";

/// BLAKE3 digest of the raw, undecoded upload bytes.
///
/// The digest is the only identity a stored object has: its on-disk name,
/// its download path and its ETag are all derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest(blake3::Hash);

impl ContentDigest {
    /// Digest of an in-memory byte slice.
    pub fn of(data: &[u8]) -> Self {
        Self(blake3::hash(data))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    /// Name of the stored object for this digest: `<hex>.png`.
    pub fn object_name(&self) -> String {
        format!("{}.{}", self.0.to_hex(), CANONICAL_EXTENSION)
    }

    /// Parse an object name back into its digest.
    ///
    /// Only the exact shape produced by [`object_name`](Self::object_name) is
    /// accepted: 64 lowercase hex characters followed by `.png`.
    pub fn from_object_name(name: &str) -> Option<Self> {
        let hex = name
            .strip_suffix(CANONICAL_EXTENSION)?
            .strip_suffix('.')?;
        if hex.len() != 64 || !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return None;
        }
        blake3::Hash::from_hex(hex).ok().map(Self)
    }
}

impl From<blake3::Hash> for ContentDigest {
    fn from(hash: blake3::Hash) -> Self {
        Self(hash)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// The two accepted upload encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
}

impl SourceFormat {
    /// Resolve a declared MIME type.
    ///
    /// Parameters (`; charset=...`) and letter case are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case("image/jpeg") {
            Some(Self::Jpeg)
        } else if essence.eq_ignore_ascii_case("image/png") {
            Some(Self::Png)
        } else {
            None
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded file, already extracted from the request body.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Content type declared for the upload part
    pub content_type: String,

    /// Raw bytes of the upload part
    pub body: Bytes,
}

impl UploadRequest {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

/// Stages of one upload transaction, in order.
///
/// A failure in any stage ends the transaction; nothing is stored unless
/// `Committing` completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    /// Reading the request body under the size ceiling
    ReceivingBody,
    /// Extracting the upload field from the multipart body
    Parsing,
    /// Single pass of decode + content hash over the upload bytes
    DecodingHashing,
    /// Normalize, encode and write to the store
    Committing,
}

impl IngestStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReceivingBody => "receiving_body",
            Self::Parsing => "parsing",
            Self::DecodingHashing => "decoding_hashing",
            Self::Committing => "committing",
        }
    }
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Digest of the raw upload
    pub digest: ContentDigest,

    /// Stored object name (`<hex>.png`)
    pub name: String,

    /// Whether this ingest created the object (false on dedup hit)
    pub written: bool,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,
}

/// Externally resolvable link to a stored object.
///
/// Never persisted; rebuilt for every response from the configured external
/// URL and the object name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicReference(Url);

impl PublicReference {
    /// `external_url` with its path replaced by `{prefix}/download/{name}`.
    pub fn for_object(server: &ServerConfig, name: &str) -> Result<Self, url::ParseError> {
        let mut url = Url::parse(&server.external_url)?;
        url.set_path(&format!("{}/download/{}", server.route_prefix, name));
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PublicReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
