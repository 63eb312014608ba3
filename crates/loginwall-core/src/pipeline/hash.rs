//! Content hashing that rides along with the decoder's reads.
//!
//! [`HashingReader`] sits between the upload bytes and the image decoder.
//! Every byte the decoder pulls through it is fed to a BLAKE3 hasher in
//! stream order, so hashing and decoding share a single traversal of the
//! input.
//!
//! The digest covers the complete upload, not just the prefix the decoder
//! happened to consume. Decoders buffer ahead and stop at different offsets,
//! so [`HashingReader::finish`] drains whatever was left unread. An image
//! with bytes appended after its end marker is therefore a different object
//! from the same image without them.

use blake3::Hasher as Blake3Hasher;
use std::io::{self, Read, Seek, SeekFrom};

use crate::types::ContentDigest;

/// A reader that hashes everything read through it.
///
/// Image decoders may seek. Each byte offset is hashed exactly once, the
/// first time it is passed over: re-reads after a backward seek are not
/// hashed again, and a forward seek over unread bytes reads them through
/// the hasher before jumping.
///
/// Invariant: `pos <= hashed` unless the inner reader was seeked past EOF.
pub struct HashingReader<R> {
    inner: R,
    hasher: Blake3Hasher,
    pos: u64,
    hashed: u64,
}

impl<R> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Blake3Hasher::new(),
            pos: 0,
            hashed: 0,
        }
    }

    /// Number of leading input bytes already folded into the digest.
    pub fn bytes_hashed(&self) -> u64 {
        self.hashed
    }

    /// Digest of the bytes hashed so far, without consuming the reader.
    pub fn digest(&self) -> ContentDigest {
        self.hasher.finalize().into()
    }

    fn observe(&mut self, chunk: &[u8]) {
        let start = self.pos;
        let end = start + chunk.len() as u64;
        if start <= self.hashed && end > self.hashed {
            let skip = (self.hashed - start) as usize;
            self.hasher.update(&chunk[skip..]);
            self.hashed = end;
        }
        self.pos = end;
    }
}

impl<R: Read + Seek> HashingReader<R> {
    /// Hash whatever the consumer left unread and return the final digest.
    ///
    /// Decoders commonly stop at the end-of-image marker. Draining the tail
    /// keeps the digest a function of the complete raw input, independent of
    /// how far the decoder read.
    pub fn finish(mut self) -> io::Result<ContentDigest> {
        if self.pos != self.hashed {
            self.inner.seek(SeekFrom::Start(self.hashed))?;
        }
        io::copy(&mut self.inner, &mut self.hasher)?;
        Ok(self.hasher.finalize().into())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.observe(&buf[..n]);
        Ok(n)
    }
}

impl<R: Read + Seek> Seek for HashingReader<R> {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let new_pos = self.inner.seek(target)?;
        if new_pos > self.hashed {
            // Read the skipped gap through the hasher, then land on new_pos.
            self.inner.seek(SeekFrom::Start(self.hashed))?;
            let gap = new_pos - self.hashed;
            let copied = io::copy(&mut (&mut self.inner).take(gap), &mut self.hasher)?;
            self.hashed += copied;
            self.inner.seek(SeekFrom::Start(new_pos))?;
        }
        self.pos = new_pos;
        Ok(new_pos)
    }
}
