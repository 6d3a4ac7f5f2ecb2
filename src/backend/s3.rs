use async_trait::async_trait;
use bytes::Bytes;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;

use super::Backend;
use crate::error::{BoxedError, StoreError};

/// S3-compatible object-store backend.
pub struct S3Backend {
    bucket: Box<Bucket>,
}

impl S3Backend {
    pub async fn new(
        bucket_name: &str,
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, StoreError> {
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.to_string(),
        };
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StoreError::Config(format!("invalid credentials: {e}")))?;
        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StoreError::Config(format!("invalid bucket {bucket_name}: {e}")))?
            .with_path_style();
        Ok(Self { bucket })
    }
}

// rust-s3 raises HTTP failures as Err only when its fail-on-err feature is
// enabled; otherwise they come back as Ok with a non-2xx status code. Both
// paths are handled below.
fn is_not_found(err: &S3Error) -> bool {
    matches!(err, S3Error::HttpFailWithBody(404, _))
}

fn status_error(code: u16) -> BoxedError {
    format!("unexpected HTTP status {code}").into()
}

fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

#[async_trait]
impl Backend for S3Backend {
    async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        match self.bucket.head_object(name).await {
            Ok((_, 404)) => Ok(false),
            Ok((_, code)) if is_success(code) => Ok(true),
            Ok((_, code)) => Err(StoreError::Unavailable(status_error(code))),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(StoreError::Unavailable(Box::new(e))),
        }
    }

    async fn put(&self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        let response = self
            .bucket
            .put_object(name, data)
            .await
            .map_err(|e| StoreError::Write {
                name: name.to_string(),
                source: Box::new(e),
            })?;
        match response.status_code() {
            code if is_success(code) => Ok(()),
            code => Err(StoreError::Write {
                name: name.to_string(),
                source: status_error(code),
            }),
        }
    }

    async fn get(&self, name: &str) -> Result<Bytes, StoreError> {
        let response = match self.bucket.get_object(name).await {
            Ok(response) => response,
            Err(e) if is_not_found(&e) => return Err(StoreError::NotFound(name.to_string())),
            Err(e) => {
                return Err(StoreError::Read {
                    name: name.to_string(),
                    source: Box::new(e),
                });
            }
        };
        match response.status_code() {
            404 => Err(StoreError::NotFound(name.to_string())),
            code if !is_success(code) => Err(StoreError::Read {
                name: name.to_string(),
                source: status_error(code),
            }),
            _ => Ok(response.bytes().clone()),
        }
    }
}
