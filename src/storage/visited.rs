//! Persistent visited set
//!
//! The visited cache file is a newline-delimited list of normalized URLs.
//! It is read once at startup and written back wholesale at shutdown (and
//! periodically during long runs).

use crate::url::NormalizedUrl;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Set of normalized URLs already processed, backed by a cache file
#[derive(Debug)]
pub struct VisitedStore {
    path: PathBuf,
    urls: HashSet<NormalizedUrl>,
    dirty: bool,
}

impl VisitedStore {
    /// Creates an empty store that will be saved to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            urls: HashSet::new(),
            dirty: false,
        }
    }

    /// Loads the store from `path`
    ///
    /// A missing file is an empty set. Blank lines are ignored.
    pub fn load(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let urls: HashSet<NormalizedUrl> = match std::fs::read_to_string(&path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(NormalizedUrl::from_canonical)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e),
        };

        tracing::debug!("Loaded {} visited URLs from {}", urls.len(), path.display());

        Ok(Self {
            path,
            urls,
            dirty: false,
        })
    }

    pub fn contains(&self, url: &NormalizedUrl) -> bool {
        self.urls.contains(url)
    }

    /// Marks a URL visited; returns false if it already was
    pub fn insert(&mut self, url: NormalizedUrl) -> bool {
        let inserted = self.urls.insert(url);
        self.dirty |= inserted;
        inserted
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the full set to the cache file, sorted
    ///
    /// The content goes to a sibling temp file first and is renamed over the
    /// cache, so an interrupted save never leaves a truncated cache behind.
    pub fn save(&mut self) -> std::io::Result<()> {
        let mut sorted: Vec<&NormalizedUrl> = self.urls.iter().collect();
        sorted.sort();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = std::io::BufWriter::new(std::fs::File::create(&tmp_path)?);
            for url in sorted {
                writeln!(file, "{}", url)?;
            }
            file.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        self.dirty = false;
        tracing::debug!(
            "Saved {} visited URLs to {}",
            self.urls.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Saves only if something changed since the last load or save
    pub fn flush(&mut self) -> std::io::Result<()> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }
}
