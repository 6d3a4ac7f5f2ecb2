use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use super::Backend;
use crate::error::StoreError;

/// Filesystem backend. Object names map directly to files under the root
/// directory, with no subdirectory sharding.
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Wrap an existing root directory.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root: path.as_ref().to_path_buf(),
        }
    }

    /// Create the root directory if needed, then wrap it.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| StoreError::Unavailable(Box::new(e)))?;
        Ok(Self { root })
    }

    fn full_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let full = self.full_path(name);
        tokio::fs::try_exists(&full)
            .await
            .map_err(|e| StoreError::Unavailable(Box::new(e)))
    }

    async fn put(&self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        let full = self.full_path(name);
        tokio::fs::write(&full, data)
            .await
            .map_err(|e| StoreError::Write {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    async fn get(&self, name: &str) -> Result<Bytes, StoreError> {
        let full = self.full_path(name);
        match tokio::fs::read(&full).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(StoreError::Read {
                name: name.to_string(),
                source: Box::new(e),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::init(dir.path()).unwrap();

        backend.put("blob1", b"world").await.unwrap();
        assert!(backend.exists("blob1").await.unwrap());

        let data = backend.get("blob1").await.unwrap();
        assert_eq!(&data[..], b"world");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());
        let err = backend.get("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(name) if name == "nope"));
    }

    #[tokio::test]
    async fn exists_is_false_for_missing_name() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path());
        assert!(!backend.exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn put_overwrites_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::init(dir.path()).unwrap();
        backend.put("blob", b"old contents").await.unwrap();
        backend.put("blob", b"new").await.unwrap();
        assert_eq!(&backend.get("blob").await.unwrap()[..], b"new");
    }

    #[tokio::test]
    async fn put_into_missing_root_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path().join("does-not-exist"));
        let err = backend.put("blob", b"data").await.unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }
}
