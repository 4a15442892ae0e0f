use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

/// Where exported files go. Writing and sharing are separate steps: a written file stays on disk
/// even if sharing turns out to be unavailable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShareSink: Send + Sync {
    /// Writes utf-8 `content` and returns where it ended up.
    async fn write(&self, file_name: &str, content: &str) -> Result<PathBuf>;

    async fn is_available(&self) -> bool;

    async fn share(&self, path: &Path) -> Result<()>;
}

/// Writes exports into a documents directory and shares them by copying into a destination
/// directory chosen by the user.
pub struct DirectorySink {
    documents_dir: PathBuf,
    destination: Option<PathBuf>,
}

impl DirectorySink {
    pub fn new(documents_dir: PathBuf, destination: Option<PathBuf>) -> Self {
        Self {
            documents_dir,
            destination,
        }
    }
}

#[async_trait]
impl ShareSink for DirectorySink {
    async fn write(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.documents_dir)
            .await
            .with_context(|| format!("Failed to create {:?}", self.documents_dir))?;
        let path = self.documents_dir.join(file_name);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {path:?}"))?;
        debug!("Written export to {path:?}");
        Ok(path)
    }

    async fn is_available(&self) -> bool {
        match &self.destination {
            Some(destination) => tokio::fs::metadata(destination)
                .await
                .map(|v| v.is_dir())
                .unwrap_or(false),
            None => false,
        }
    }

    async fn share(&self, path: &Path) -> Result<()> {
        let destination = self
            .destination
            .as_ref()
            .ok_or_else(|| anyhow!("No share destination configured"))?;
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("{path:?} is not a file"))?;
        let target = destination.join(file_name);
        // Copying a file onto itself truncates it.
        if is_same_file(path, &target).await? {
            info!("{path:?} is already in {destination:?}");
            return Ok(());
        }
        tokio::fs::copy(path, &target)
            .await
            .with_context(|| format!("Failed to copy {path:?} to {target:?}"))?;
        info!("Shared {path:?} to {target:?}");
        Ok(())
    }
}

async fn is_same_file(source: &Path, target: &Path) -> Result<bool> {
    let source = tokio::fs::canonicalize(source)
        .await
        .with_context(|| format!("Failed to resolve {source:?}"))?;
    match tokio::fs::canonicalize(target).await {
        Ok(target) => Ok(source == target),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to resolve {target:?}")),
    }
}
