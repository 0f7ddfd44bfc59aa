//! Artifact storage for tag scan codes and animal photos.
//!
//! Artifacts are keyed strings (`scan_codes/<tag>.png`,
//! `animal_photos/<tag>.jpg`). Writes either land fully or not at all —
//! the tagging service removes freshly written artifacts if the tag row
//! cannot be persisted afterwards, so a stored tag never references a
//! missing file.

use fieldsport_core::error::{PlatformError, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

/// Binary artifact storage keyed by relative path.
pub trait ArtifactStore: Send + Sync {
    /// Writes `bytes` under `key`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Persistence`] on I/O failure.
    fn put(&self, key: &str, bytes: Vec<u8>)
        -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;

    /// Removes the artifact under `key` if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Persistence`] on I/O failure.
    fn remove(&self, key: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;

    /// Reads the artifact under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Persistence`] on I/O failure or when the
    /// artifact is missing.
    fn get(&self, key: &str) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send>>;
}

/// Local filesystem artifact store rooted at a directory.
#[derive(Clone, Debug)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(root: impl Into<PathBuf>) -> Arc<dyn ArtifactStore> {
        Arc::new(Self::new(root))
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        // Keys are platform-generated, but refuse traversal anyway.
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(PlatformError::Persistence(format!(
                "invalid artifact key: {key}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ArtifactStore for LocalArtifactStore {
    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
        let path = self.resolve(key);
        let key = key.to_string();
        Box::pin(async move {
            let path = path?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    PlatformError::Persistence(format!("failed to create artifact dir: {e}"))
                })?;
            }
            tokio::fs::write(&path, bytes).await.map_err(|e| {
                PlatformError::Persistence(format!("failed to write artifact {key}: {e}"))
            })
        })
    }

    fn remove(&self, key: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
        let path = self.resolve(key);
        let key = key.to_string();
        Box::pin(async move {
            let path = path?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(PlatformError::Persistence(format!(
                    "failed to remove artifact {key}: {e}"
                ))),
            }
        })
    }

    fn get(&self, key: &str) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send>> {
        let path = self.resolve(key);
        let key = key.to_string();
        Box::pin(async move {
            let path = path?;
            tokio::fs::read(&path).await.map_err(|e| {
                PlatformError::Persistence(format!("failed to read artifact {key}: {e}"))
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());

        store
            .put("scan_codes/abc.png", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(store.get("scan_codes/abc.png").await.unwrap(), vec![1, 2, 3]);

        store.remove("scan_codes/abc.png").await.unwrap();
        assert!(store.get("scan_codes/abc.png").await.is_err());
        // Removing twice is fine.
        store.remove("scan_codes/abc.png").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_keys_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());
        assert!(store.put("../escape.png", vec![0]).await.is_err());
    }
}
