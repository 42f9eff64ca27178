//! Breadth-first crawl frontier
//!
//! This module owns the crawl order:
//! - A strict FIFO queue of `CrawlTask`s, so every task at depth D is
//!   processed before any task at depth D + 1
//! - Enqueue-time de-duplication, so a URL linked from many pages is queued
//!   once per run
//! - The admissibility check applied when a task is popped

use crate::storage::VisitedStore;
use crate::url::{ExclusionFilter, NormalizedUrl};
use std::collections::{HashSet, VecDeque};

/// A URL waiting to be processed, with its link distance from the seed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTask {
    pub url: NormalizedUrl,
    pub depth: u32,
}

impl CrawlTask {
    pub fn new(url: NormalizedUrl, depth: u32) -> Self {
        Self { url, depth }
    }
}

/// Result of the admissibility check for a popped task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Fetch it
    Admit,
    /// Already in the visited set
    AlreadyVisited,
    /// Matches an exclusion pattern
    Excluded,
}

/// FIFO frontier with de-duplication and depth tracking
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
    enqueued: HashSet<NormalizedUrl>,
    exclusions: ExclusionFilter,
    max_depth: Option<u32>,
    forced: Option<NormalizedUrl>,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `exclusions` - Patterns that keep URLs out of the crawl
    /// * `max_depth` - Deepest depth whose links are still followed; `None` is unbounded
    pub fn new(exclusions: ExclusionFilter, max_depth: Option<u32>) -> Self {
        Self {
            queue: VecDeque::new(),
            enqueued: HashSet::new(),
            exclusions,
            max_depth,
            forced: None,
        }
    }

    /// Queues the seed at depth 0
    ///
    /// A visited seed is only queued when `force` is set; it then bypasses
    /// the visited check once. Returns whether the seed was queued.
    pub fn seed(&mut self, seed: NormalizedUrl, force: bool, visited: &VisitedStore) -> bool {
        if visited.contains(&seed) && !force {
            tracing::info!("Seed {} already visited; nothing to do", seed);
            return false;
        }

        if force {
            self.forced = Some(seed.clone());
        }
        self.enqueued.insert(seed.clone());
        self.queue.push_back(CrawlTask::new(seed, 0));
        true
    }

    /// Queues a task unless it is visited, excluded, or already queued
    /// during this run
    pub fn enqueue(&mut self, task: CrawlTask, visited: &VisitedStore) -> bool {
        if visited.contains(&task.url) || self.exclusions.matches(&task.url) {
            return false;
        }
        if !self.enqueued.insert(task.url.clone()) {
            return false;
        }

        tracing::trace!("Enqueued {} at depth {}", task.url, task.depth);
        self.queue.push_back(task);
        true
    }

    pub fn dequeue(&mut self) -> Option<CrawlTask> {
        self.queue.pop_front()
    }

    /// Decides whether a popped URL is fetched
    ///
    /// Exclusion is checked first and always wins. The visited check is
    /// skipped for a forced seed until it has been processed.
    pub fn is_admissible(&self, url: &NormalizedUrl, visited: &VisitedStore) -> Admission {
        if self.exclusions.matches(url) {
            return Admission::Excluded;
        }
        if visited.contains(url) && self.forced.as_ref() != Some(url) {
            return Admission::AlreadyVisited;
        }
        Admission::Admit
    }

    /// Called once the forced seed has been processed
    pub fn clear_forced(&mut self) {
        self.forced = None;
    }

    /// Whether links found on a page at `depth` are followed
    pub fn should_expand(&self, depth: u32) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
