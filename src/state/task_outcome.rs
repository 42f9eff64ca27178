/// Outcome definitions for processed crawl tasks
///
/// Every task popped from the frontier ends in exactly one of these states.
use std::fmt;

/// Represents how a popped crawl task was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskOutcome {
    // ===== Success States =====
    /// Resource was fetched and its artifact written
    Mirrored,

    /// Resource already existed on disk and was not downloaded again
    AlreadyStored,

    // ===== Skip States =====
    /// URL was in the visited set
    SkippedVisited,

    /// URL matched an exclusion pattern
    Excluded,

    /// Request was refused by the request policy
    Blocked,

    // ===== Error States =====
    /// Fetch failed after exhausting retries
    FetchFailed,

    /// Fetch succeeded but the artifact could not be written
    WriteFailed,
}

impl TaskOutcome {
    /// Returns true if the resource is on disk after this outcome
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Mirrored | Self::AlreadyStored)
    }

    /// Returns true if the task was skipped without any network activity
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::SkippedVisited | Self::Excluded)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::WriteFailed)
    }

    /// Returns true if the URL ends up in the visited set
    ///
    /// Only resolved fetches are recorded: the artifact is on disk, retries
    /// were exhausted, or the request policy refused it. Skips leave the set
    /// untouched, and so does a failed write, so the next run tries again.
    pub fn marks_visited(&self) -> bool {
        matches!(
            self,
            Self::Mirrored | Self::AlreadyStored | Self::FetchFailed | Self::Blocked
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mirrored => "mirrored",
            Self::AlreadyStored => "already_stored",
            Self::SkippedVisited => "skipped_visited",
            Self::Excluded => "excluded",
            Self::Blocked => "blocked",
            Self::FetchFailed => "fetch_failed",
            Self::WriteFailed => "write_failed",
        }
    }

    /// Returns all possible outcomes
    pub fn all() -> [Self; 7] {
        [
            Self::Mirrored,
            Self::AlreadyStored,
            Self::SkippedVisited,
            Self::Excluded,
            Self::Blocked,
            Self::FetchFailed,
            Self::WriteFailed,
        ]
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_disjoint() {
        for outcome in TaskOutcome::all() {
            let categories = [outcome.is_success(), outcome.is_skipped(), outcome.is_error()]
                .iter()
                .filter(|c| **c)
                .count();
            assert!(categories <= 1, "{} is in more than one category", outcome);
        }
    }

    #[test]
    fn test_marks_visited() {
        assert!(TaskOutcome::Mirrored.marks_visited());
        assert!(TaskOutcome::FetchFailed.marks_visited());
        assert!(TaskOutcome::Blocked.marks_visited());
        assert!(!TaskOutcome::SkippedVisited.marks_visited());
        assert!(!TaskOutcome::Excluded.marks_visited());
        assert!(!TaskOutcome::WriteFailed.marks_visited());
    }

    #[test]
    fn test_display() {
        assert_eq!(TaskOutcome::AlreadyStored.to_string(), "already_stored");
    }
}
