//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TaskOutcome`: how each popped crawl task was resolved

mod task_outcome;

pub use task_outcome::TaskOutcome;
