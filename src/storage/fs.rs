use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::DownloadSink;
use crate::core::DocgenResult;
use crate::models::GeneratedArtifact;

/// Writes downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct FsDownloadSink {
    dir: PathBuf,
}

impl FsDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FsDownloadSink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a file with this name lands. Path separators are flattened to `_`.
    pub fn target_path(&self, filename: &str) -> PathBuf {
        let flat: String = filename
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(flat)
    }
}

#[async_trait]
impl DownloadSink for FsDownloadSink {
    async fn save(&self, artifact: GeneratedArtifact) -> DocgenResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.target_path(&artifact.filename);
        tokio::fs::write(&path, &artifact.bytes).await?;

        tracing::info!(
            path = %path.display(),
            size_bytes = artifact.len(),
            content_type = artifact.content_type,
            "download saved"
        );
        Ok(())
    }
}
