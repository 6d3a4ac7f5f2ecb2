use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_MAX_NAME_ATTEMPTS;

/// Storage configuration, read once at startup and immutable afterwards.
///
/// `use_remote` picks the backend: the `[remote]` table when set,
/// `local_root` otherwise. The half that is not selected may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub use_remote: bool,
    #[serde(default)]
    pub local_root: Option<PathBuf>,
    /// Cap on name-generation attempts before giving up.
    #[serde(default = "default_max_name_attempts")]
    pub max_name_attempts: u32,
    /// Per-backend-call timeout in seconds. Absent means calls may block
    /// indefinitely, matching the historical behavior.
    #[serde(default)]
    pub op_timeout_secs: Option<u64>,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

fn default_max_name_attempts() -> u32 {
    DEFAULT_MAX_NAME_ATTEMPTS
}

impl StoreConfig {
    /// Configuration for a filesystem store rooted at `root`.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            use_remote: false,
            local_root: Some(root.into()),
            max_name_attempts: default_max_name_attempts(),
            op_timeout_secs: None,
            remote: None,
        }
    }

    /// Configuration for an object-store backend.
    pub fn remote(remote: RemoteConfig) -> Self {
        Self {
            use_remote: true,
            local_root: None,
            max_name_attempts: default_max_name_attempts(),
            op_timeout_secs: None,
            remote: Some(remote),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("config not found at {}", path.display()))?;
        toml::from_str(&content).context("failed to parse config")
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_local_config() {
        let config: StoreConfig = toml::from_str(
            r#"
            use_remote = false
            local_root = "/tmp/store"
            "#,
        )
        .unwrap();
        assert!(!config.use_remote);
        assert_eq!(config.local_root.as_deref(), Some(Path::new("/tmp/store")));
        assert_eq!(config.max_name_attempts, DEFAULT_MAX_NAME_ATTEMPTS);
        assert!(config.op_timeout_secs.is_none());
        assert!(config.remote.is_none());
    }

    #[test]
    fn parse_remote_config() {
        let config: StoreConfig = toml::from_str(
            r#"
            use_remote = true
            max_name_attempts = 50
            op_timeout_secs = 30

            [remote]
            endpoint = "http://localhost:9000"
            region = "auto"
            bucket = "blobs"
            access_key = "minioadmin"
            secret_key = "minioadmin"
            "#,
        )
        .unwrap();
        assert!(config.use_remote);
        assert_eq!(config.max_name_attempts, 50);
        assert_eq!(config.op_timeout_secs, Some(30));
        assert_eq!(config.remote.unwrap().bucket, "blobs");
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swapstore.toml");
        let config = StoreConfig::local("/srv/blobs");
        config.save(&path).unwrap();

        let loaded = StoreConfig::load(&path).unwrap();
        assert!(!loaded.use_remote);
        assert_eq!(loaded.local_root, config.local_root);
    }
}
