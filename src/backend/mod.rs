pub mod local;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

/// A store of opaque named blobs in a flat namespace.
///
/// `exists` must report a failed check as [`StoreError::Unavailable`],
/// never fold it into `false`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn exists(&self, name: &str) -> Result<bool, StoreError>;
    async fn put(&self, name: &str, data: &[u8]) -> Result<(), StoreError>;
    async fn get(&self, name: &str) -> Result<Bytes, StoreError>;
}
