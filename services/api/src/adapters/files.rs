//! services/api/src/adapters/files.rs
//!
//! Filesystem adapter for the `FileStore` port: uploaded selfies and the
//! static welcome PDF live under a single uploads directory.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use cardex_core::ports::{FileStore, PortError, PortResult};

/// A `FileStore` backed by a directory on local disk.
#[derive(Clone)]
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolves a stored path against the root, rejecting traversal
    /// components so a crafted photo_url cannot escape the uploads dir.
    fn resolve(&self, path: &str) -> PortResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(PortError::Validation(format!("Invalid path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStore for FsFileStore {
    async fn read(&self, path: &str) -> PortResult<Vec<u8>> {
        let full = self.resolve(path)?;
        tokio::fs::read(&full).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                PortError::NotFound(format!("File not found: {}", path))
            }
            _ => PortError::Unexpected(e.to_string()),
        })
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> PortResult<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        tokio::fs::write(&full, bytes)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
