//! Run statistics
//!
//! Counters collected by the coordinator while the crawl runs, and the
//! summary printed when it ends.

use crate::state::TaskOutcome;
use std::collections::BTreeMap;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// Count of tasks by outcome
    pub outcomes: BTreeMap<TaskOutcome, u64>,

    /// Total fetch attempts, retries included
    pub fetch_attempts: u64,

    /// Links returned by the dispatcher
    pub links_discovered: u64,

    /// Links accepted into the frontier
    pub links_enqueued: u64,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl CrawlStats {
    pub fn record(&mut self, outcome: TaskOutcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    pub fn count(&self, outcome: TaskOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Number of tasks popped from the frontier
    pub fn tasks_processed(&self) -> u64 {
        self.outcomes.values().sum()
    }

    /// Number of tasks that reached the fetcher
    pub fn tasks_fetched(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| !outcome.is_skipped() && **outcome != TaskOutcome::AlreadyStored)
            .map(|(_, count)| count)
            .sum()
    }

    /// Number of tasks whose resource ended up on disk
    pub fn resources_on_disk(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_success())
            .map(|(_, count)| count)
            .sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Tasks processed: {}", stats.tasks_processed());
    println!("  Tasks fetched: {}", stats.tasks_fetched());
    println!("  Resources on disk: {}", stats.resources_on_disk());
    println!("  Fetch attempts: {}", stats.fetch_attempts);
    println!("  Links discovered: {}", stats.links_discovered);
    println!("  Links enqueued: {}", stats.links_enqueued);
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    println!("Tasks by Outcome:");
    let total = stats.tasks_processed();
    for outcome in TaskOutcome::all() {
        let count = stats.count(outcome);
        if count == 0 {
            continue;
        }
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", outcome, count, percentage);
    }
    println!();

    let errors: u64 = stats
        .outcomes
        .iter()
        .filter(|(outcome, _)| outcome.is_error())
        .map(|(_, count)| count)
        .sum();
    if errors > 0 {
        println!("Errors: {} (see log for details)", errors);
    }
}
