use std::time::Duration;

use thiserror::Error;

/// Boxed source error carried inside [`StoreError`] variants.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Everything a storage operation can fail with. No variant is recovered
/// from internally; callers see each one directly.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object does not exist in the active backend.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The backend could not be reached or refused the request — an auth or
    /// network failure, never a missing object.
    #[error("storage backend unavailable")]
    Unavailable(#[source] BoxedError),

    #[error("write failed for object {name}")]
    Write {
        name: String,
        #[source]
        source: BoxedError,
    },

    #[error("read failed for object {name}")]
    Read {
        name: String,
        #[source]
        source: BoxedError,
    },

    /// Name generation gave up after the configured number of attempts.
    #[error("no free object name after {0} attempts")]
    NamespaceExhausted(u32),

    /// A configured per-call timeout elapsed.
    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid storage configuration: {0}")]
    Config(String),
}
