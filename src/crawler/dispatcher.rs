//! Content dispatcher
//!
//! Classifies a fetched resource, writes its artifact, and returns the links
//! it yields. Classification precedence:
//!
//! 1. Path ends in `.pdf` -> [`ResourceKind::Pdf`]: bytes written only if the
//!    artifact is not already on disk; no links
//! 2. URL contains a configured API pattern -> [`ResourceKind::StructuredApi`]:
//!    JSON written pretty-printed; `html_url` and, for file entries,
//!    `download_url` are followed
//! 3. Anything else -> [`ResourceKind::Html`]: raw body written; anchors (or
//!    directory-listing entries) on the seed's host are followed

use crate::crawler::fetcher::FetchResult;
use crate::crawler::parser::extract_links;
use crate::output::{ArtifactWriter, HTML_INDEX, JSON_INDEX};
use crate::url::{is_same_host, resolve_link, NormalizedUrl, UrlNormalizer};
use crate::{MirrorError, UrlError};
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use url::Url;

/// Closed set of resource kinds the dispatcher knows how to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Html,
    Pdf,
    StructuredApi,
}

impl ResourceKind {
    /// File name appended when the URL has no file segment
    pub fn default_file(&self) -> &'static str {
        match self {
            Self::Html | Self::Pdf => HTML_INDEX,
            Self::StructuredApi => JSON_INDEX,
        }
    }
}

/// Picks the resource kind for a URL
///
/// API patterns are matched as substrings of the URL with its scheme
/// removed, e.g. `api.github.com/repos/`.
pub fn classify(url: &Url, api_patterns: &[String]) -> ResourceKind {
    if url.path().to_ascii_lowercase().ends_with(".pdf") {
        return ResourceKind::Pdf;
    }

    let without_scheme = url
        .as_str()
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url.as_str());
    if api_patterns
        .iter()
        .any(|pattern| without_scheme.contains(pattern.as_str()))
    {
        return ResourceKind::StructuredApi;
    }

    ResourceKind::Html
}

/// What the dispatcher did with one fetched resource
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub kind: ResourceKind,
    /// Artifact location
    pub artifact: PathBuf,
    /// False when an existing artifact was kept as-is
    pub written: bool,
    /// Newly discovered links, normalized and de-duplicated
    pub links: Vec<NormalizedUrl>,
}

/// Routes fetched resources to their storage and link-extraction branch
#[derive(Debug, Clone)]
pub struct ContentDispatcher {
    writer: ArtifactWriter,
    normalizer: UrlNormalizer,
    seed_host: String,
    api_patterns: Vec<String>,
}

impl ContentDispatcher {
    pub fn new(
        writer: ArtifactWriter,
        normalizer: UrlNormalizer,
        seed_host: impl Into<String>,
        api_patterns: Vec<String>,
    ) -> Self {
        Self {
            writer,
            normalizer,
            seed_host: seed_host.into().to_lowercase(),
            api_patterns,
        }
    }

    /// Normalizes a URL with the configured tracking-parameter list
    pub fn normalize(&self, url: &Url) -> Result<NormalizedUrl, UrlError> {
        self.normalizer.normalize_parsed(url)
    }

    pub fn classify(&self, url: &Url) -> ResourceKind {
        classify(url, &self.api_patterns)
    }

    /// True if `url` is a PDF whose artifact already exists
    ///
    /// Checked before fetching so existing downloads are never repeated.
    pub fn already_stored(&self, url: &Url) -> bool {
        let kind = self.classify(url);
        kind == ResourceKind::Pdf && self.writer.exists(url, kind.default_file())
    }

    /// Persists a fetched resource and returns the links it yields
    ///
    /// # Returns
    ///
    /// * `Ok(Dispatched)` - Artifact written (or kept) and links extracted;
    ///   malformed content yields zero links rather than an error
    /// * `Err(MirrorError::Io)` - The artifact could not be written
    pub fn dispatch(&self, result: &FetchResult) -> Result<Dispatched, MirrorError> {
        let kind = self.classify(&result.final_url);
        tracing::debug!(
            "Dispatching {} as {:?} ({})",
            result.final_url,
            kind,
            result.content_type
        );

        match kind {
            ResourceKind::Pdf => self.dispatch_pdf(result),
            ResourceKind::StructuredApi => self.dispatch_api(result),
            ResourceKind::Html => self.dispatch_html(result),
        }
    }

    fn dispatch_pdf(&self, result: &FetchResult) -> Result<Dispatched, MirrorError> {
        let kind = ResourceKind::Pdf;
        let path = self.writer.path_for(&result.final_url, kind.default_file());

        let written = if path.is_file() {
            tracing::debug!("Keeping existing {}", path.display());
            false
        } else {
            self.writer
                .write(&result.final_url, kind.default_file(), &result.body)?;
            true
        };

        Ok(Dispatched {
            kind,
            artifact: path,
            written,
            links: Vec::new(),
        })
    }

    fn dispatch_api(&self, result: &FetchResult) -> Result<Dispatched, MirrorError> {
        let kind = ResourceKind::StructuredApi;

        let value: Value = match serde_json::from_slice(&result.body) {
            Ok(value) => value,
            Err(e) => {
                let error = MirrorError::Parse {
                    url: result.final_url.to_string(),
                    message: e.to_string(),
                };
                tracing::warn!("{}; storing raw body", error);
                let artifact =
                    self.writer
                        .write(&result.final_url, kind.default_file(), &result.body)?;
                return Ok(Dispatched {
                    kind,
                    artifact,
                    written: true,
                    links: Vec::new(),
                });
            }
        };

        let pretty = serde_json::to_vec_pretty(&value).map_err(|e| MirrorError::Parse {
            url: result.final_url.to_string(),
            message: e.to_string(),
        })?;
        let artifact = self
            .writer
            .write(&result.final_url, kind.default_file(), &pretty)?;

        let candidates = api_entry_links(&value, &result.final_url);
        let links = self.normalize_all(candidates);

        Ok(Dispatched {
            kind,
            artifact,
            written: true,
            links,
        })
    }

    fn dispatch_html(&self, result: &FetchResult) -> Result<Dispatched, MirrorError> {
        let kind = ResourceKind::Html;
        let artifact = self
            .writer
            .write(&result.final_url, kind.default_file(), &result.body)?;

        let body = result.text();
        let candidates: Vec<Url> = extract_links(&body, &result.final_url)
            .into_iter()
            .filter(|url| {
                let same = is_same_host(url, &self.seed_host);
                if !same {
                    tracing::trace!("Dropping off-host link {}", url);
                }
                same
            })
            .collect();

        Ok(Dispatched {
            kind,
            artifact,
            written: true,
            links: self.normalize_all(candidates),
        })
    }

    /// Normalizes links, dropping failures and duplicates, keeping order
    fn normalize_all(&self, candidates: Vec<Url>) -> Vec<NormalizedUrl> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for candidate in candidates {
            match self.normalizer.normalize_parsed(&candidate) {
                Ok(normalized) => {
                    if seen.insert(normalized.clone()) {
                        links.push(normalized);
                    }
                }
                Err(e) => tracing::debug!("Failed to normalize URL {}: {}", candidate, e),
            }
        }

        links
    }
}

/// Collects entry links from an API response
///
/// The body is either one entry object or an array of them. Each entry
/// contributes `html_url`, plus `download_url` when `type` is `"file"`.
/// Missing, null or non-string fields are skipped.
fn api_entry_links(value: &Value, base_url: &Url) -> Vec<Url> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    };

    let mut links = Vec::new();
    for entry in entries {
        if let Some(html_url) = entry.get("html_url").and_then(Value::as_str) {
            if let Some(url) = resolve_link(html_url, base_url) {
                links.push(url);
            }
        }

        let is_file = entry.get("type").and_then(Value::as_str) == Some("file");
        if is_file {
            if let Some(download_url) = entry.get("download_url").and_then(Value::as_str) {
                if let Some(url) = resolve_link(download_url, base_url) {
                    links.push(url);
                }
            }
        }
    }

    links
}
