//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the other components
//! together:
//! - Loading the visited cache and seeding the frontier
//! - Popping tasks in breadth-first order and checking admissibility
//! - Fetching through the retrying fetcher and dispatching the content
//! - Feeding discovered links back into the frontier
//! - Persisting the visited cache periodically and at shutdown

use crate::config::Settings;
use crate::crawler::dispatcher::ContentDispatcher;
use crate::crawler::fetcher::{FetchError, HttpPageFetcher, PageFetcher};
use crate::crawler::frontier::{Admission, CrawlTask, Frontier};
use crate::crawler::retry::{RetryPolicy, RetryingFetcher};
use crate::output::{ArtifactWriter, CrawlStats};
use crate::state::TaskOutcome;
use crate::storage::VisitedStore;
use crate::url::{extract_domain, ExclusionFilter, NormalizedUrl, UrlNormalizer};
use crate::{MirrorError, UrlError};
use std::time::Instant;

/// Tasks between progress log lines
const PROGRESS_INTERVAL: u64 = 10;

/// Tasks between visited-cache saves
const FLUSH_INTERVAL: u64 = 50;

/// Main crawler coordinator structure
pub struct Coordinator<F> {
    seed: NormalizedUrl,
    force: bool,
    frontier: Frontier,
    visited: VisitedStore,
    fetcher: RetryingFetcher<F>,
    dispatcher: ContentDispatcher,
    stats: CrawlStats,
    started: Option<Instant>,
}

impl Coordinator<HttpPageFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `settings` - The resolved run settings
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(MirrorError)` - The HTTP client could not be built or the
    ///   visited cache could not be read
    pub fn new(settings: Settings) -> Result<Self, MirrorError> {
        let fetcher = HttpPageFetcher::new(&settings.http)?;
        Self::with_fetcher(settings, fetcher)
    }
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a coordinator around any `PageFetcher`
    pub fn with_fetcher(settings: Settings, fetcher: F) -> Result<Self, MirrorError> {
        let normalizer = UrlNormalizer::new(settings.tracking_params.clone());
        let seed = normalizer.normalize_parsed(&settings.seed)?;
        let seed_host = extract_domain(&settings.seed).ok_or(UrlError::MissingHost)?;

        let visited = VisitedStore::load(&settings.visited_cache)?;
        tracing::info!(
            "Loaded {} visited URLs from {}",
            visited.len(),
            settings.visited_cache.display()
        );

        let exclusions = ExclusionFilter::new(settings.ignore_patterns.iter());
        if !exclusions.is_empty() {
            tracing::debug!("Exclusion patterns: {:?}", exclusions.patterns());
        }

        let writer = ArtifactWriter::new(&settings.output_dir);
        tracing::info!("Writing artifacts under {}", writer.root().display());

        let dispatcher = ContentDispatcher::new(
            writer,
            normalizer,
            seed_host,
            settings.api_patterns.clone(),
        );

        Ok(Self {
            seed,
            force: settings.force,
            frontier: Frontier::new(exclusions, settings.max_depth),
            visited,
            fetcher: RetryingFetcher::new(
                fetcher,
                RetryPolicy::from(&settings.retry),
                settings.delay,
            ),
            dispatcher,
            stats: CrawlStats::default(),
            started: None,
        })
    }

    /// Runs the crawl loop until the frontier is empty
    ///
    /// Per-task failures are logged and counted; only a failure to save the
    /// visited cache at the end aborts the run.
    pub async fn run(&mut self) -> Result<(), MirrorError> {
        self.started = Some(Instant::now());
        tracing::info!("Starting crawl from {}", self.seed);

        if !self
            .frontier
            .seed(self.seed.clone(), self.force, &self.visited)
        {
            return Ok(());
        }

        let mut processed: u64 = 0;
        while let Some(task) = self.frontier.dequeue() {
            tracing::debug!("Processing {} (depth {})", task.url, task.depth);

            let outcome = self.process_task(&task).await;
            self.stats.record(outcome);
            self.stats.fetch_attempts = self.fetcher.attempts_made();
            processed += 1;

            if processed % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "Progress: {} tasks processed, {} in frontier, {} visited",
                    processed,
                    self.frontier.len(),
                    self.visited.len()
                );
            }

            if processed % FLUSH_INTERVAL == 0 {
                if let Err(e) = self.visited.flush() {
                    tracing::warn!(
                        "Failed to save visited cache {}: {}",
                        self.visited.path().display(),
                        e
                    );
                }
            }
        }

        tracing::info!("Frontier is empty, crawl complete");
        Ok(())
    }

    /// Resolves one task and returns its outcome
    async fn process_task(&mut self, task: &CrawlTask) -> TaskOutcome {
        match self.frontier.is_admissible(&task.url, &self.visited) {
            Admission::Excluded => {
                tracing::debug!("Skipping excluded {}", task.url);
                return TaskOutcome::Excluded;
            }
            Admission::AlreadyVisited => {
                tracing::trace!("Skipping visited {}", task.url);
                return TaskOutcome::SkippedVisited;
            }
            Admission::Admit => {}
        }

        if task.url == self.seed {
            self.frontier.clear_forced();
        }

        let outcome = match task.url.to_url() {
            Ok(url) if self.dispatcher.already_stored(&url) => {
                tracing::debug!("{} already stored, not fetching", task.url);
                TaskOutcome::AlreadyStored
            }
            Ok(url) => self.fetch_and_dispatch(task, &url).await,
            Err(e) => {
                tracing::warn!("Cannot fetch {}: {}", task.url, e);
                TaskOutcome::FetchFailed
            }
        };

        if outcome.marks_visited() {
            self.visited.insert(task.url.clone());
        }
        outcome
    }

    async fn fetch_and_dispatch(&mut self, task: &CrawlTask, url: &url::Url) -> TaskOutcome {
        let result = match self.fetcher.fetch(url).await {
            Ok(result) => result,
            Err(failure) => {
                tracing::warn!(
                    "Giving up on {} after {} attempt(s): {}",
                    failure.url,
                    failure.attempts,
                    failure.last
                );
                return match failure.last {
                    FetchError::Blocked(_) => TaskOutcome::Blocked,
                    _ => TaskOutcome::FetchFailed,
                };
            }
        };

        let dispatched = match self.dispatcher.dispatch(&result) {
            Ok(dispatched) => dispatched,
            Err(e) => {
                tracing::error!("Failed to store {}: {}", result.final_url, e);
                return TaskOutcome::WriteFailed;
            }
        };

        tracing::info!(
            "Mirrored {} -> {} ({} links)",
            task.url,
            dispatched.artifact.display(),
            dispatched.links.len()
        );

        if result.final_url != *url {
            self.record_redirect_target(task, &result.final_url);
        }

        if self.frontier.should_expand(task.depth) {
            let next_depth = task.depth.saturating_add(1);
            for link in dispatched.links {
                self.stats.links_discovered += 1;
                if self
                    .frontier
                    .enqueue(CrawlTask::new(link, next_depth), &self.visited)
                {
                    self.stats.links_enqueued += 1;
                }
            }
        } else {
            tracing::trace!("Depth limit reached at {}", task.url);
        }

        if dispatched.written {
            TaskOutcome::Mirrored
        } else {
            TaskOutcome::AlreadyStored
        }
    }

    /// Marks the final URL of a redirect visited so links to it are not
    /// fetched again
    fn record_redirect_target(&mut self, task: &CrawlTask, final_url: &url::Url) {
        match self.dispatcher.normalize(final_url) {
            Ok(target) if target != task.url => {
                tracing::debug!("{} redirected to {}", task.url, target);
                self.visited.insert(target);
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("Failed to normalize redirect target {}: {}", final_url, e),
        }
    }

    /// Saves the visited cache and returns the final statistics
    ///
    /// Safe to call after an interrupted `run`.
    pub fn finish(&mut self) -> Result<CrawlStats, MirrorError> {
        self.visited.flush()?;
        tracing::info!(
            "Saved {} visited URLs to {}",
            self.visited.len(),
            self.visited.path().display()
        );

        self.stats.fetch_attempts = self.fetcher.attempts_made();
        self.stats.elapsed = self
            .started
            .map(|started| started.elapsed())
            .unwrap_or_default();
        Ok(self.stats.clone())
    }

}
