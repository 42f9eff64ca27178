//! Storage module for state that outlives a run
//!
//! The only durable crawl state is the visited set; mirrored artifacts are
//! handled by [`crate::output`].

mod visited;

pub use visited::VisitedStore;
