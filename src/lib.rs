//! # fundscrape
//!
//! Engine for extracting tabular fund records from a paginated,
//! dynamically rendered web listing, turning an unstable sequence of
//! rendered pages into one schema-consistent, ordered dataset per
//! session.
//!
//! ## Features
//!
//! - **Runtime schema**: columns are discovered from the first page's
//!   header row and bind every subsequent row
//! - **Resilient pagination**: bounded waits, transient/fatal failure
//!   classification, configurable retry backoff
//! - **Swappable next-page detection**: an ordered strategy list instead
//!   of hardcoded selectors
//! - **Partial results**: failed or cancelled sessions still hand back
//!   everything extracted so far, plus an error summary
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fundscrape::{run_session, ScrapeConfig};
//! use fundscrape::render::chromium::ChromiumSession;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> fundscrape::Result<()> {
//!     let config = ScrapeConfig::new("https://example.com/fund/search");
//!     let mut session = ChromiumSession::launch(Duration::from_secs(90)).await?;
//!
//!     let outcome = run_session(config, &mut session).await?;
//!     println!("{}: {} records", outcome.status, outcome.dataset.len());
//!
//!     fundscrape::export::write_csv(&outcome.dataset, "data".as_ref())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    PaginationController                      │
//! │  Idle → FetchingPage → ExtractingPage → CheckingNextPage     │
//! │            ↑ Retrying ↓          → {Done | Failed | Cancelled}│
//! └──────────────────────────────────────────────────────────────┘
//!        │               │                │              │
//! ┌──────┴─────┬─────────┴──────┬─────────┴──────┬───────┴──────┐
//! │ RetryPolicy│ ExtractionEngine│ NextPageStrategy│ Dataset     │
//! ├────────────┼────────────────┼────────────────┼──────────────┤
//! │ Backoff    │ Schema         │ Next control   │ Ordering     │
//! │ Classify   │ Pad / truncate │ Page index     │ Drift count  │
//! │ Budget     │ Drift warnings │ (swappable)    │ Finalize     │
//! └────────────┴────────────────┴────────────────┴──────────────┘
//!                          │
//!               RenderSession (headless Chrome, or any backend)
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Common data-model types
pub mod types;

/// Runtime schema established from header rows
pub mod schema;

/// The consumed rendering capability and its headless-Chrome backend
pub mod render;

/// Bounded, backing-off retry
pub mod retry;

/// Per-page extraction
pub mod extract;

/// Next-page detection strategies
pub mod pagination;

/// Dataset accumulation and ordering invariants
pub mod dataset;

/// The pagination controller and session lifecycle
pub mod session;

/// CSV/JSON export of finalized datasets
pub mod export;

/// Session configuration
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ScrapeConfig;
pub use dataset::{Dataset, DatasetAccumulator};
pub use error::{Error, Result};
pub use extract::ExtractionEngine;
pub use pagination::{default_strategies, Advance, NextPageStrategy};
pub use render::{ControlState, RenderSession};
pub use retry::{default_classify, BackoffType, FailureClass, RetryPolicy, RetryableOp};
pub use schema::Schema;
pub use session::{
    run_session, CancelHandle, PaginationController, SessionOutcome, SessionState, SessionStats,
};
pub use types::{
    ErrorEntry, ErrorSummary, FundRecord, PageResult, SessionStatus, TableData,
    PAGE_NUMBER_COLUMN, SCRAPED_AT_COLUMN,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
