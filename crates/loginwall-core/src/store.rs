//! Content-addressable object store on a flat directory.
//!
//! Each object lives at `<root>/<hex digest>.png`. The directory listing is
//! the index: there is no manifest and no database.
//!
//! # Write-once contract
//!
//! [`ContentStore::put`] writes an object at most once per digest. A put for
//! a digest that is already present returns without touching the file. Two
//! concurrent puts for the same digest race on a no-clobber rename of a
//! fully written temporary file; the loser discards its copy and reports a
//! dedup hit. Readers therefore never observe a partially written object
//! under a valid name.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::types::ContentDigest;

/// Prefix of in-flight temporary files. Never a valid object name.
const INCOMING_PREFIX: &str = ".incoming-";

/// Outcome of a [`ContentStore::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    /// Object name (`<hex>.png`)
    pub name: String,
    /// True if this call created the object
    pub written: bool,
}

/// A stored object resolved by [`ContentStore::get`].
///
/// Readers open `path` themselves; the file never changes once it exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object name (`<hex>.png`)
    pub name: String,
    /// Digest the name was derived from
    pub digest: ContentDigest,
    /// Location on disk
    pub path: PathBuf,
}

/// Filesystem-backed content-addressable store.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;
        tracing::debug!("Object store at {:?}", root);
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk location for a digest's object.
    pub fn path_for(&self, digest: &ContentDigest) -> PathBuf {
        self.root.join(digest.object_name())
    }

    /// Whether an object exists for this digest.
    pub async fn contains(&self, digest: &ContentDigest) -> Result<bool, StoreError> {
        let path = self.path_for(digest);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StoreError::io(path, e))
    }

    /// Store canonical bytes under `digest`, at most once.
    ///
    /// Idempotent: when the object already exists nothing is written and
    /// `written` is false. The bytes are never compared against the stored
    /// copy; identical digests are taken to mean identical content.
    pub async fn put(
        &self,
        digest: &ContentDigest,
        encoded: Vec<u8>,
    ) -> Result<PutOutcome, StoreError> {
        let name = digest.object_name();
        if self.contains(digest).await? {
            tracing::debug!(object = %name, "Object already stored, skipping write");
            return Ok(PutOutcome {
                name,
                written: false,
            });
        }

        let root = self.root.clone();
        let target = self.path_for(digest);
        let written = tokio::task::spawn_blocking(move || write_once(&root, &target, &encoded))
            .await
            .map_err(|e| StoreError::io(&self.root, std::io::Error::other(e)))??;

        if written {
            tracing::debug!(object = %name, "Stored new object");
        } else {
            tracing::debug!(object = %name, "Lost write race to identical object");
        }
        Ok(PutOutcome { name, written })
    }

    /// Resolve the object stored under `name`.
    ///
    /// Names that are not of the canonical `<hex>.png` shape can never have
    /// been produced by [`put`](Self::put) and are reported as `NotFound`,
    /// as is a canonical name with no file behind it. Other I/O failures
    /// stay distinct from `NotFound`.
    pub async fn get(&self, name: &str) -> Result<StoredObject, StoreError> {
        let digest = ContentDigest::from_object_name(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let path = self.path_for(&digest);

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(StoreError::NotFound(name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => return Err(StoreError::io(path, e)),
        }

        Ok(StoredObject {
            name: name.to_string(),
            digest,
            path,
        })
    }
}

/// Write `bytes` to a temp file in `root` and move it to `target` unless
/// something is already there. Returns whether this call created `target`.
fn write_once(root: &Path, target: &Path, bytes: &[u8]) -> Result<bool, StoreError> {
    let mut temp = tempfile::Builder::new()
        .prefix(INCOMING_PREFIX)
        .suffix(".part")
        .tempfile_in(root)
        .map_err(|e| StoreError::io(root, e))?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| StoreError::io(temp.path(), e))?;

    match temp.persist_noclobber(target) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(StoreError::io(target, e.error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn scratch_store() -> (tempfile::TempDir, ContentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::open(dir.path().join("objects")).await.unwrap();
        (dir, store)
    }

    fn entries(store: &ContentStore) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_put_then_get_returns_identical_bytes() {
        let (_dir, store) = scratch_store().await;
        let digest = ContentDigest::of(b"raw upload");

        let outcome = store.put(&digest, b"canonical png".to_vec()).await.unwrap();
        assert!(outcome.written);
        assert_eq!(outcome.name, digest.object_name());

        let object = store.get(&outcome.name).await.unwrap();
        assert_eq!(object.digest, digest);
        assert_eq!(object.path, store.path_for(&digest));
        assert_eq!(std::fs::read(&object.path).unwrap(), b"canonical png");
    }

    #[tokio::test]
    async fn test_put_is_write_once() {
        let (_dir, store) = scratch_store().await;
        let digest = ContentDigest::of(b"raw upload");

        store.put(&digest, b"first".to_vec()).await.unwrap();
        let path = store.path_for(&digest);
        let mtime_before = std::fs::metadata(&path).unwrap().modified().unwrap();

        let second = store.put(&digest, b"second".to_vec()).await.unwrap();
        assert!(!second.written);
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), mtime_before);
    }

    #[tokio::test]
    async fn test_concurrent_puts_write_exactly_once() {
        let (_dir, store) = scratch_store().await;
        let digest = ContentDigest::of(b"contended");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.put(&digest, vec![7u8; 4096]).await })
            })
            .collect();

        let mut written = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().written {
                written += 1;
            }
        }
        assert_eq!(written, 1);
        assert_eq!(entries(&store), vec![digest.object_name()]);
        assert_eq!(std::fs::read(store.path_for(&digest)).unwrap(), vec![7u8; 4096]);
    }

    #[tokio::test]
    async fn test_distinct_digests_do_not_interfere() {
        let (_dir, store) = scratch_store().await;
        let a = ContentDigest::of(b"a");
        let b = ContentDigest::of(b"b");

        let (ra, rb) = tokio::join!(store.put(&a, b"AAA".to_vec()), store.put(&b, b"BBB".to_vec()));
        assert!(ra.unwrap().written);
        assert!(rb.unwrap().written);
        assert_eq!(std::fs::read(store.path_for(&a)).unwrap(), b"AAA");
        assert_eq!(std::fs::read(store.path_for(&b)).unwrap(), b"BBB");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_dir, store) = scratch_store().await;
        let name = ContentDigest::of(b"never uploaded").object_name();
        let err = store.get(&name).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_rejects_non_canonical_names() {
        let (dir, store) = scratch_store().await;
        std::fs::write(dir.path().join("secret.txt"), b"hidden").unwrap();

        for name in ["../secret.txt", "secret.txt", "", ".incoming-abc.part"] {
            let err = store.get(name).await.unwrap_err();
            assert!(err.is_not_found(), "{name:?} should be NotFound");
        }
    }

    #[tokio::test]
    async fn test_get_ignores_directories_with_object_names() {
        let (_dir, store) = scratch_store().await;
        let digest = ContentDigest::of(b"dir");
        std::fs::create_dir(store.path_for(&digest)).unwrap();

        let err = store.get(&digest.object_name()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_contains_tracks_puts() {
        let (_dir, store) = scratch_store().await;
        let digest = ContentDigest::of(b"x");
        assert!(!store.contains(&digest).await.unwrap());
        store.put(&digest, b"x".to_vec()).await.unwrap();
        assert!(store.contains(&digest).await.unwrap());
    }
}
