use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use rand::Rng;
use tracing::debug;

use crate::backend::Backend;
use crate::backend::local::LocalBackend;
use crate::backend::s3::S3Backend;
use crate::config::StoreConfig;
use crate::error::StoreError;

const NAME_LEN: usize = 64;
const NAME_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Default cap on name-generation attempts.
pub const DEFAULT_MAX_NAME_ATTEMPTS: u32 = 1000;

/// Blob storage over a backend picked once at construction time.
///
/// Names handed out by [`generate_available_name`](Self::generate_available_name)
/// are checked against the backend but nothing reserves them: two concurrent
/// callers can race between the check and the write.
pub struct SwappableStore {
    backend: Arc<dyn Backend>,
    max_name_attempts: u32,
    op_timeout: Option<Duration>,
}

impl std::fmt::Debug for SwappableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwappableStore")
            .field("max_name_attempts", &self.max_name_attempts)
            .field("op_timeout", &self.op_timeout)
            .finish_non_exhaustive()
    }
}

impl SwappableStore {
    /// Wrap an injected backend with default settings.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            max_name_attempts: DEFAULT_MAX_NAME_ATTEMPTS,
            op_timeout: None,
        }
    }

    pub fn with_max_name_attempts(mut self, attempts: u32) -> Self {
        self.max_name_attempts = attempts;
        self
    }

    /// Bound every backend call. Unset by default, so calls may block for as
    /// long as the backend does.
    pub fn with_op_timeout(mut self, limit: Duration) -> Self {
        self.op_timeout = Some(limit);
        self
    }

    /// Build the backend the configuration selects and wrap it.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let backend: Arc<dyn Backend> = if config.use_remote {
            let remote = config.remote.as_ref().ok_or_else(|| {
                StoreError::Config("use_remote is set but [remote] is missing".to_string())
            })?;
            Arc::new(
                S3Backend::new(
                    &remote.bucket,
                    &remote.endpoint,
                    &remote.region,
                    &remote.access_key,
                    &remote.secret_key,
                )
                .await?,
            )
        } else {
            let root = config.local_root.as_ref().ok_or_else(|| {
                StoreError::Config("use_remote is unset but local_root is missing".to_string())
            })?;
            Arc::new(LocalBackend::init(root)?)
        };

        let mut store = Self::new(backend).with_max_name_attempts(config.max_name_attempts);
        if let Some(secs) = config.op_timeout_secs {
            store = store.with_op_timeout(Duration::from_secs(secs));
        }
        Ok(store)
    }

    /// Returns a random name unused in the active backend.
    ///
    /// Candidates are 64 lowercase-alphanumeric characters from the OS RNG,
    /// so collisions are effectively impossible; the attempt cap keeps a
    /// misbehaving backend from looping this forever.
    pub async fn generate_available_name(&self) -> Result<String, StoreError> {
        for _ in 0..self.max_name_attempts {
            let name = random_name();
            if !self.run(self.backend.exists(&name)).await? {
                return Ok(name);
            }
            debug!(%name, "generated name already taken, retrying");
        }
        Err(StoreError::NamespaceExhausted(self.max_name_attempts))
    }

    /// Store `data` under `name`, or under a freshly generated name when none
    /// is given. Existing contents under the same name are overwritten.
    /// Returns the name used.
    pub async fn upload(&self, data: &[u8], name: Option<&str>) -> Result<String, StoreError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.generate_available_name().await?,
        };
        self.run(self.backend.put(&name, data)).await?;
        debug!(%name, bytes = data.len(), "object stored");
        Ok(name)
    }

    /// Fetch the full contents stored under `name`.
    pub async fn download(&self, name: &str) -> Result<Bytes, StoreError> {
        let data = self.run(self.backend.get(name)).await?;
        debug!(%name, bytes = data.len(), "object fetched");
        Ok(data)
    }

    async fn run<T>(
        &self,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match self.op_timeout {
            Some(limit) => tokio::time::timeout(limit, op)
                .await
                .map_err(|_| StoreError::Timeout(limit))?,
            None => op.await,
        }
    }
}

fn random_name() -> String {
    let mut rng = rand::rngs::OsRng;
    (0..NAME_LEN)
        .map(|_| NAME_ALPHABET[rng.gen_range(0..NAME_ALPHABET.len())] as char)
        .collect()
}
