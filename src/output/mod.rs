//! Output module for the mirrored file tree and run summaries
//!
//! This module handles:
//! - Mapping URLs to deterministic file paths
//! - Writing fetched resources under the output root
//! - Recording crawl statistics

mod artifacts;
pub mod paths;
pub mod stats;

pub use artifacts::ArtifactWriter;
pub use paths::{artifact_path, has_known_extension, HTML_INDEX, JSON_INDEX};
pub use stats::{print_statistics, CrawlStats};
