use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::StoreError;

/// Persists finished crops and hands back a locator for them.
#[async_trait]
pub trait CropStore: Send + Sync {
    async fn put(&self, bytes: &[u8], name: &str) -> Result<String, StoreError>;
}

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl CropStore for DirectoryStore {
    async fn put(&self, bytes: &[u8], name: &str) -> Result<String, StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        tokio::fs::write(&path, bytes).await?;
        Ok(path.display().to_string())
    }
}
