//! Local filesystem object store.
//!
//! Mirrors the S3 key layout under a root directory, for development, dry
//! runs and tests. Production deployments should use `S3ObjectStore`.
//!
//! ## Storage Layout
//!
//! ```text
//! {local_dir}/{bucket}/
//! └── reddit/{subreddit}/YYYY-MM-DD/{kind}_{id}.json
//! ```

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::StorageConfig;
use crate::storage::ObjectStore;

/// Filesystem-backed object store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root_dir: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Root at `{local_dir}/{bucket}`.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(Path::new(&config.local_dir).join(&config.bucket))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Resolve a key to a path, refusing anything that escapes the root.
    fn path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(AppError::validation(format!("invalid object key: {key:?}")));
        }
        Ok(self.root_dir.join(relative))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the object doesn't exist.
    pub async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read and decode a stored JSON object.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn ensure_bucket(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;
        Ok(())
    }

    async fn put_json(&self, key: &str, value: &Value) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_put_and_read() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path());

        let key = "reddit/test/2025-01-01/submission_abc.json";
        store.put_json(key, &json!({"kind": "submission"})).await.unwrap();

        let loaded: Value = store.read_json(key).await.unwrap().unwrap();
        assert_eq!(loaded["kind"], "submission");
        assert!(!tmp.path().join("reddit/test/2025-01-01/submission_abc.tmp").exists());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path());

        store.put_json("a.json", &json!({"v": 1})).await.unwrap();
        store.put_json("a.json", &json!({"v": 2})).await.unwrap();

        let loaded: Value = store.read_json("a.json").await.unwrap().unwrap();
        assert_eq!(loaded["v"], 2);
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path());

        assert!(store.read_bytes("nope.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let tmp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(tmp.path());

        assert!(store.put_json("../outside.json", &json!({})).await.is_err());
        assert!(store.put_json("/abs.json", &json!({})).await.is_err());
        assert!(store.put_json("", &json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_bucket_creates_root() {
        let tmp = TempDir::new().unwrap();
        let config = StorageConfig {
            local_dir: tmp.path().to_string_lossy().into_owned(),
            bucket: "raw".to_string(),
            ..StorageConfig::default()
        };
        let store = LocalObjectStore::from_config(&config);

        store.ensure_bucket().await.unwrap();
        assert!(tmp.path().join("raw").is_dir());
        store.ensure_bucket().await.unwrap();
    }
}
