//! Filesystem blob storage for sealed file content.
//!
//! Blobs are addressed by an opaque generated location string
//! (`{uuid}.enc`), never by the original filename: locations cannot
//! collide and plaintext names never leak into path structure. The store
//! holds whatever bytes it is given — encryption happens above it and it
//! never sees plaintext.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("invalid blob location: {0}")]
    InvalidLocation(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

/// Content store rooted at a single directory.
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> BlobStoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `data` under a freshly generated opaque location and returns it.
    pub fn write(&self, data: &[u8]) -> BlobStoreResult<String> {
        let location = format!("{}.enc", Uuid::new_v4());
        fs::write(self.root.join(&location), data)?;
        debug!(%location, size = data.len(), "blob written");
        Ok(location)
    }

    /// Reads the blob at `location`.
    pub fn read(&self, location: &str) -> BlobStoreResult<Vec<u8>> {
        let path = self.resolve(location)?;
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobStoreError::NotFound(location.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes the blob at `location`.
    pub fn delete(&self, location: &str) -> BlobStoreResult<()> {
        let path = self.resolve(location)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobStoreError::NotFound(location.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self, location: &str) -> bool {
        self.resolve(location)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Locations are single generated path components; anything that could
    /// escape the root is rejected.
    fn resolve(&self, location: &str) -> BlobStoreResult<PathBuf> {
        if location.is_empty()
            || location.contains('/')
            || location.contains('\\')
            || location.contains("..")
        {
            return Err(BlobStoreError::InvalidLocation(location.to_string()));
        }
        Ok(self.root.join(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, BlobStore) {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn write_read_roundtrip() {
        let (_dir, store) = store();
        let location = store.write(b"sealed bytes").unwrap();
        assert_eq!(store.read(&location).unwrap(), b"sealed bytes");
    }

    #[test]
    fn locations_are_opaque_and_unique() {
        let (_dir, store) = store();
        let l1 = store.write(b"same content").unwrap();
        let l2 = store.write(b"same content").unwrap();
        assert_ne!(l1, l2);
        assert!(l1.ends_with(".enc"));
    }

    #[test]
    fn read_missing_blob_is_not_found() {
        let (_dir, store) = store();
        let err = store.read("no-such-blob.enc").unwrap_err();
        assert!(matches!(err, BlobStoreError::NotFound(_)));
    }

    #[test]
    fn delete_removes_blob() {
        let (_dir, store) = store();
        let location = store.write(b"short lived").unwrap();
        assert!(store.exists(&location));
        store.delete(&location).unwrap();
        assert!(!store.exists(&location));
        assert!(matches!(
            store.delete(&location),
            Err(BlobStoreError::NotFound(_))
        ));
    }

    #[test]
    fn traversal_locations_rejected() {
        let (_dir, store) = store();
        for bad in ["../etc/passwd", "a/b.enc", "..", ""] {
            assert!(matches!(
                store.read(bad),
                Err(BlobStoreError::InvalidLocation(_))
            ));
        }
    }
}
