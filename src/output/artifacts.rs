//! Writing mirrored resources to disk

use crate::output::paths::artifact_path;
use std::path::{Path, PathBuf};
use url::Url;

/// Writes artifacts under a fixed output root
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path where the artifact for `url` lives
    pub fn path_for(&self, url: &Url, default_file: &str) -> PathBuf {
        artifact_path(&self.root, url, default_file)
    }

    pub fn exists(&self, url: &Url, default_file: &str) -> bool {
        self.path_for(url, default_file).is_file()
    }

    /// Writes `content` to the artifact path for `url`, replacing any
    /// earlier copy
    pub fn write(&self, url: &Url, default_file: &str, content: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.path_for(url, default_file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(path)
    }
}
