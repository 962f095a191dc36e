//! Pagination controller
//!
//! Owns the session loop that turns an unstable sequence of rendered
//! pages into one finished dataset. Each iteration fetches and extracts
//! the current page under the retry policy, hands accepted rows to the
//! accumulator, then evaluates the next-page strategies. The loop ends
//! when no strategy matches, the page ceiling is reached, a fatal failure
//! is classified, or the caller cancels.
//!
//! Pagination is strictly sequential: advancing is a stateful UI action,
//! so no two pages are ever processed concurrently and correctness
//! depends on never losing or duplicating a page number.

mod types;

pub use types::{CancelHandle, SessionOutcome, SessionState, SessionStats};

use crate::config::ScrapeConfig;
use crate::dataset::DatasetAccumulator;
use crate::error::{Error, Result};
use crate::extract::ExtractionEngine;
use crate::pagination::{default_strategies, Advance, NextPageStrategy};
use crate::render::RenderSession;
use crate::retry::{default_classify, FailureClass, RetryableOp};
use crate::schema::Schema;
use crate::types::{ErrorSummary, SessionStatus, TableData};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// ============================================================================
// Retryable steps
// ============================================================================

struct NavigateOp<'a, S: ?Sized> {
    session: &'a mut S,
    url: &'a str,
}

#[async_trait]
impl<S: RenderSession + ?Sized> RetryableOp for NavigateOp<'_, S> {
    type Output = ();

    async fn attempt(&mut self) -> Result<()> {
        self.session.navigate(self.url).await
    }
}

struct FetchPageOp<'a, S: ?Sized> {
    session: &'a mut S,
    marker: &'a str,
    timeout: Duration,
}

#[async_trait]
impl<S: RenderSession + ?Sized> RetryableOp for FetchPageOp<'_, S> {
    type Output = TableData;

    async fn attempt(&mut self) -> Result<TableData> {
        self.session.wait_for_ready(self.marker, self.timeout).await?;
        let table = self.session.read_table().await?;
        ExtractionEngine::require_table(table)
    }
}

// ============================================================================
// Controller
// ============================================================================

fn transition(state: &mut SessionState, next: SessionState) {
    debug!(from = %state, to = %next, "state transition");
    *state = next;
}

/// Drives one pagination traversal over a rendering session
pub struct PaginationController {
    config: ScrapeConfig,
    engine: ExtractionEngine,
    strategies: Vec<Box<dyn NextPageStrategy>>,
    cancel: CancelHandle,
}

impl PaginationController {
    /// Create a controller with the default next-page strategy list
    pub fn new(config: ScrapeConfig) -> Self {
        let engine = ExtractionEngine::new().with_absent_marker(config.absent_marker.clone());
        Self {
            config,
            engine,
            strategies: default_strategies(),
            cancel: CancelHandle::new(),
        }
    }

    /// Replace the next-page strategy list (evaluated in order, first
    /// match wins)
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn NextPageStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Handle for cancelling this controller's in-flight run between page
    /// iterations
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run one complete session.
    ///
    /// The rendering session is closed on every exit path. Expected
    /// failure modes (exhausted retries, fatal extraction failures,
    /// cancellation) come back as an `Ok` outcome carrying a `Failed` or
    /// `Cancelled` status with the partial dataset; only invariant
    /// breaches and invalid configs are `Err`.
    pub async fn run(&self, session: &mut dyn RenderSession) -> Result<SessionOutcome> {
        self.config.validate()?;
        let started = Instant::now();

        let mut outcome = self.drive(session).await;
        if let Err(error) = session.close().await {
            warn!(%error, "failed to close rendering session");
        }
        if let Ok(outcome) = &mut outcome {
            outcome.stats.set_duration(started.elapsed().as_millis() as u64);
        }
        outcome
    }

    async fn drive(&self, session: &mut dyn RenderSession) -> Result<SessionOutcome> {
        let mut state = SessionState::Idle;
        let mut stats = SessionStats::default();
        let mut summary = ErrorSummary::new();
        let mut accumulator = DatasetAccumulator::new();
        let mut schema: Option<Arc<Schema>> = None;

        info!(url = %self.config.url, max_pages = self.config.max_pages, "starting session");

        transition(&mut state, SessionState::FetchingPage);
        let nav = self
            .config
            .retry
            .execute_observed(
                "navigate",
                default_classify,
                |_, _| stats.add_retry(),
                &mut NavigateOp {
                    session: &mut *session,
                    url: &self.config.url,
                },
            )
            .await;

        if let Err(error) = nav {
            summary.record(1, &error);
            transition(&mut state, SessionState::Failed);
            return Ok(self.finish(accumulator, SessionStatus::Failed, summary, stats));
        }

        let mut page: u32 = 1;
        let status = loop {
            if self.cancel.is_cancelled() {
                info!(page, "session cancelled");
                transition(&mut state, SessionState::Cancelled);
                break SessionStatus::Cancelled;
            }

            transition(&mut state, SessionState::FetchingPage);
            let first_page = schema.is_none();
            // A missing table is worth retrying once a schema proved the
            // listing renders one; on the schema-establishing page it is
            // fatal.
            let classify = move |error: &Error| match error {
                Error::Extraction { .. } if first_page => FailureClass::Fatal,
                other => default_classify(other),
            };

            let fetched = self
                .config
                .retry
                .execute_observed(
                    &format!("fetch page {page}"),
                    classify,
                    |_, _| {
                        transition(&mut state, SessionState::Retrying);
                        stats.add_retry();
                    },
                    &mut FetchPageOp {
                        session: &mut *session,
                        marker: &self.config.ready_marker,
                        timeout: self.config.step_timeout(),
                    },
                )
                .await;

            let table = match fetched {
                Ok(table) => table,
                Err(error) => {
                    warn!(page, %error, "page fetch failed, aborting session");
                    summary.record(page, &error);
                    transition(&mut state, SessionState::Failed);
                    break SessionStatus::Failed;
                }
            };
            stats.add_page();

            transition(&mut state, SessionState::ExtractingPage);
            let schema_arc = match &schema {
                Some(existing) => Arc::clone(existing),
                None => match self.engine.establish_schema(&table) {
                    Ok(established) => {
                        info!(columns = established.len(), "schema established");
                        accumulator.set_schema(Arc::clone(&established));
                        schema = Some(Arc::clone(&established));
                        established
                    }
                    Err(error) => {
                        summary.record(page, &error);
                        transition(&mut state, SessionState::Failed);
                        break SessionStatus::Failed;
                    }
                },
            };

            let mut page_result = self.engine.extract_page(&table, &schema_arc, page);
            summary.add_drift(page_result.drift_warnings);
            stats.add_records(page_result.len());

            transition(&mut state, SessionState::CheckingNextPage);
            let mut advanced = false;
            if page >= self.config.max_pages {
                info!(max_pages = self.config.max_pages, "page ceiling reached");
            } else {
                for strategy in &self.strategies {
                    match strategy.advance(&mut *session).await {
                        Ok(Advance::Advanced) => {
                            debug!(strategy = strategy.name(), page, "advanced to next page");
                            advanced = true;
                            break;
                        }
                        Ok(Advance::NoMatch) => {}
                        Err(error) => {
                            // Strategy probes are best-effort; a failed
                            // probe falls through to the next strategy.
                            debug!(strategy = strategy.name(), %error, "strategy probe failed");
                        }
                    }
                }
            }
            page_result.has_next = advanced;

            // An out-of-order page here is a controller bug, not an
            // expected failure mode; let it propagate.
            accumulator.append(page_result)?;

            if !advanced {
                transition(&mut state, SessionState::Done);
                break SessionStatus::Done;
            }

            if !self.config.settle_delay().is_zero() {
                tokio::time::sleep(self.config.settle_delay()).await;
            }
            page += 1;
        };

        Ok(self.finish(accumulator, status, summary, stats))
    }

    fn finish(
        &self,
        mut accumulator: DatasetAccumulator,
        status: SessionStatus,
        summary: ErrorSummary,
        stats: SessionStats,
    ) -> SessionOutcome {
        let dataset = accumulator.finalize();
        info!(
            %status,
            records = dataset.len(),
            pages = stats.pages_fetched,
            retries = stats.retries,
            drift_warnings = summary.drift_warnings,
            "session finished"
        );
        SessionOutcome {
            dataset,
            status,
            errors: summary,
            stats,
        }
    }
}

/// Run one session: the single entry point an orchestration layer calls
pub async fn run_session(
    config: ScrapeConfig,
    session: &mut dyn RenderSession,
) -> Result<SessionOutcome> {
    PaginationController::new(config).run(session).await
}
