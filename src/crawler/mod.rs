//! Crawler module for fetching and mirroring a single site
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` seam, with retry and backoff
//! - Request blocking by resource type
//! - HTML and directory-listing link extraction
//! - Content dispatch to the HTML, PDF and API branches
//! - The breadth-first frontier and overall crawl coordination

mod coordinator;
mod dispatcher;
mod fetcher;
mod frontier;
mod parser;
pub mod policy;
mod retry;

pub use coordinator::Coordinator;
pub use dispatcher::{classify, ContentDispatcher, Dispatched, ResourceKind};
pub use fetcher::{
    build_http_client, FetchError, FetchResult, HttpPageFetcher, PageFetcher, MAX_REDIRECTS,
};
pub use frontier::{Admission, CrawlTask, Frontier};
pub use parser::{extract_anchor_links, extract_links, extract_listing_links, is_directory_listing};
pub use policy::{RequestPolicy, ResourceType};
pub use retry::{FetchFailure, RetryPolicy, RetryingFetcher};

use crate::config::Settings;
use crate::output::CrawlStats;
use crate::MirrorError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the visited cache
/// 2. Build the HTTP client
/// 3. Fetch pages breadth-first from the seed until the frontier is empty
///    or Ctrl-C is pressed
/// 4. Save the visited cache, whatever stopped the loop
///
/// # Arguments
///
/// * `settings` - The resolved run settings
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed or was interrupted
/// * `Err(MirrorError)` - Crawl could not start, failed, or the cache could
///   not be saved
pub async fn crawl(settings: Settings) -> Result<CrawlStats, MirrorError> {
    let mut coordinator = Coordinator::new(settings)?;

    let outcome = tokio::select! {
        result = coordinator.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, saving visited cache");
            Ok(())
        }
    };

    let stats = coordinator.finish()?;
    outcome.map(|()| stats)
}
