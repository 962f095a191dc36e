//! Session types
//!
//! Controller state, cancellation handle, statistics and the finished
//! session outcome.

use crate::dataset::Dataset;
use crate::types::{ErrorSummary, SessionStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Internal controller state, logged on every transition.
///
/// `Done`, `Failed` and `Cancelled` correspond to the terminal
/// [`SessionStatus`] values; the rest are in-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session not yet started
    Idle,
    /// Waiting for the current page's content to be present
    FetchingPage,
    /// Mapping the current page's table onto the schema
    ExtractingPage,
    /// Evaluating next-page strategies
    CheckingNextPage,
    /// A transient failure occurred; the retry policy will re-enter the
    /// fetch for the same page number
    Retrying,
    /// Terminal success
    Done,
    /// Terminal failure; rows accumulated so far are preserved
    Failed,
    /// Terminal cancellation; rows accumulated so far are preserved
    Cancelled,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FetchingPage => "fetching_page",
            Self::ExtractingPage => "extracting_page",
            Self::CheckingNextPage => "checking_next_page",
            Self::Retrying => "retrying",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// Cooperative cancellation flag for an in-flight session.
///
/// Cancellation takes effect between page iterations, never
/// mid-extraction. Cloneable; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create a fresh, uncancelled handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Statistics from one session
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    /// Pages successfully fetched and extracted
    pub pages_fetched: usize,
    /// Records extracted across all pages
    pub records_extracted: usize,
    /// Individual retry attempts spent
    pub retries: usize,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl SessionStats {
    /// Add a fetched page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add extracted records
    pub fn add_records(&mut self, count: usize) {
        self.records_extracted += count;
    }

    /// Add a retry attempt
    pub fn add_retry(&mut self) {
        self.retries += 1;
    }

    /// Set the duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Everything a finished session hands back to its caller.
///
/// Expected failure modes never surface as `Err`: a failed or cancelled
/// session still yields an outcome with its partial dataset and the error
/// summary.
#[derive(Debug)]
pub struct SessionOutcome {
    /// The finalized (possibly partial) dataset
    pub dataset: Dataset,
    /// Terminal status
    pub status: SessionStatus,
    /// Failures and warnings collected along the way
    pub errors: ErrorSummary,
    /// Session statistics
    pub stats: SessionStats,
}
