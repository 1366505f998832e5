//! Byte-level document storage

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

/// Where a collection's serialized document lives
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Read the whole document; `None` if it has never been written
    async fn load(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replace the whole document. Must not return before the bytes are durable.
    async fn store(&self, bytes: &[u8]) -> io::Result<()>;

    /// Human-readable location for logs and errors
    fn location(&self) -> String;
}

/// Document stored as a single file, replaced via write-to-temp + rename
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn write_temp(temp_path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::File::create(temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for FileBackend {
    async fn load(&self) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn store(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        let written = match Self::write_temp(&temp_path, bytes).await {
            Ok(()) => tokio::fs::rename(&temp_path, &self.path).await,
            Err(e) => Err(e),
        };

        if written.is_err() {
            if let Err(e) = tokio::fs::remove_file(&temp_path).await {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove temp file {}: {}", temp_path.display(), e);
                }
            }
        }
        written
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
