//! End-to-end session tests against a scripted rendering backend.
//!
//! `MockSite` plays a paginated listing from canned table snapshots:
//! failure injection per page, a next control that advances through the
//! script, and a closed flag so every exit path can be checked.

use async_trait::async_trait;
use fundscrape::render::{ControlState, RenderSession};
use fundscrape::{
    BackoffType, CancelHandle, Error, PaginationController, Result, RetryPolicy, ScrapeConfig,
    SessionStatus, TableData,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::time::Duration;

const NEXT_SELECTOR: &str = "a.next";

// ============================================================================
// Scripted rendering session
// ============================================================================

#[derive(Default)]
struct MockSite {
    pages: Vec<TableData>,
    current: usize,
    /// 1-based page -> remaining transient ready failures to inject
    ready_failures: HashMap<usize, u32>,
    /// Pretend the table container never renders
    missing_table: bool,
    refuse_navigation: bool,
    /// Cancel this handle when the next control is clicked
    cancel_on_advance: Option<CancelHandle>,
    fetches: u32,
    clicks: u32,
    closed: bool,
}

impl MockSite {
    fn new(pages: Vec<TableData>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    fn fail_ready(mut self, page: usize, times: u32) -> Self {
        self.ready_failures.insert(page, times);
        self
    }

    fn has_more(&self) -> bool {
        self.current + 1 < self.pages.len()
    }
}

#[async_trait]
impl RenderSession for MockSite {
    async fn navigate(&mut self, _url: &str) -> Result<()> {
        if self.refuse_navigation {
            return Err(Error::navigation("connection refused"));
        }
        Ok(())
    }

    async fn wait_for_ready(&mut self, marker: &str, timeout: Duration) -> Result<()> {
        let page = self.current + 1;
        if let Some(remaining) = self.ready_failures.get_mut(&page) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::timeout(marker, timeout.as_millis() as u64));
            }
        }
        Ok(())
    }

    async fn read_table(&mut self) -> Result<Option<TableData>> {
        self.fetches += 1;
        if self.missing_table {
            return Ok(None);
        }
        Ok(Some(self.pages[self.current].clone()))
    }

    async fn find_control(&mut self, selector: &str) -> Result<ControlState> {
        if selector != NEXT_SELECTOR {
            return Ok(ControlState::Missing);
        }
        if self.has_more() {
            Ok(ControlState::Enabled)
        } else {
            Ok(ControlState::Disabled)
        }
    }

    async fn read_text(&mut self, _selector: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        assert_eq!(selector, NEXT_SELECTOR, "unexpected click target");
        self.current += 1;
        self.clicks += 1;
        if let Some(handle) = &self.cancel_on_advance {
            handle.cancel();
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn table(rows: &[&[&str]]) -> TableData {
    TableData::new(
        vec!["Name".into(), "NAV".into(), "AUM".into()],
        rows.iter()
            .map(|row| row.iter().map(|c| (*c).to_string()).collect())
            .collect(),
    )
}

fn listing(pages: usize) -> Vec<TableData> {
    (1..=pages)
        .map(|p| {
            table(&[
                &[&format!("Fund {p}A"), "1.00", "100"],
                &[&format!("Fund {p}B"), "2.00", "200"],
            ])
        })
        .collect()
}

fn fast_config(max_attempts: u32) -> ScrapeConfig {
    ScrapeConfig::new("https://example.com/fund/search")
        .with_settle_delay(Duration::ZERO)
        .with_retry(
            RetryPolicy::new(max_attempts)
                .with_backoff(BackoffType::Constant)
                .with_initial_delay(Duration::from_millis(1)),
        )
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_completes_multi_page_listing() {
    let mut site = MockSite::new(listing(3));
    let outcome = PaginationController::new(fast_config(3))
        .run(&mut site)
        .await
        .unwrap();

    assert_eq!(outcome.status, SessionStatus::Done);
    assert_eq!(outcome.dataset.len(), 6);
    assert_eq!(outcome.stats.pages_fetched, 3);
    assert_eq!(outcome.stats.retries, 0);
    assert!(outcome.errors.is_clean());
    assert!(site.closed);

    let pages: Vec<u32> = outcome
        .dataset
        .records
        .iter()
        .map(|r| r.page_number)
        .collect();
    assert_eq!(pages, vec![1, 1, 2, 2, 3, 3]);

    // Every record answers every schema column.
    let schema = outcome.dataset.schema.as_ref().unwrap();
    for record in &outcome.dataset.records {
        for column in schema.columns() {
            assert!(record.get(column).is_some());
        }
    }
}

#[tokio::test]
async fn test_retries_transient_fetch_failures() {
    let mut site = MockSite::new(listing(3)).fail_ready(2, 2);
    let outcome = PaginationController::new(fast_config(3))
        .run(&mut site)
        .await
        .unwrap();

    assert_eq!(outcome.status, SessionStatus::Done);
    assert_eq!(outcome.dataset.len(), 6);
    assert_eq!(outcome.stats.retries, 2);
    assert!(outcome.errors.entries.is_empty());
    assert!(site.closed);
}

#[tokio::test]
async fn test_exhausted_budget_preserves_partial_rows() {
    let mut site = MockSite::new(listing(3)).fail_ready(2, 5);
    let outcome = PaginationController::new(fast_config(2))
        .run(&mut site)
        .await
        .unwrap();

    assert_eq!(outcome.status, SessionStatus::Failed);
    assert_eq!(outcome.dataset.len(), 2);
    assert!(outcome
        .dataset
        .records
        .iter()
        .all(|r| r.page_number == 1));

    assert_eq!(outcome.errors.entries.len(), 1);
    assert_eq!(outcome.errors.entries[0].page_number, 2);
    assert_eq!(outcome.errors.entries[0].kind, "retry_exhausted");
    assert!(site.closed);
}

#[tokio::test]
async fn test_stops_when_next_control_disabled() {
    let mut site = MockSite::new(listing(4));
    let outcome = PaginationController::new(fast_config(3))
        .run(&mut site)
        .await
        .unwrap();

    assert_eq!(outcome.status, SessionStatus::Done);
    assert_eq!(site.fetches, 4);
    assert_eq!(site.clicks, 3);
    assert_eq!(outcome.dataset.records.last().unwrap().page_number, 4);
}

#[tokio::test]
async fn test_honors_page_ceiling() {
    let mut site = MockSite::new(listing(5));
    let config = fast_config(3).with_max_pages(2);
    let outcome = PaginationController::new(config)
        .run(&mut site)
        .await
        .unwrap();

    assert_eq!(outcome.status, SessionStatus::Done);
    assert_eq!(outcome.stats.pages_fetched, 2);
    assert_eq!(site.fetches, 2);
    assert_eq!(
        outcome
            .dataset
            .records
            .iter()
            .map(|r| r.page_number)
            .max(),
        Some(2)
    );
}

#[tokio::test]
async fn test_drifting_rows_are_padded_and_truncated() {
    let mut pages = listing(1);
    pages.push(TableData::new(
        vec!["Name".into(), "NAV".into(), "AUM".into()],
        vec![
            vec!["Fund 2A".into()],
            vec![
                "Fund 2B".into(),
                "2.00".into(),
                "200".into(),
                "extra".into(),
            ],
        ],
    ));

    let mut site = MockSite::new(pages);
    let config = fast_config(3).with_absent_marker("N/A");
    let outcome = PaginationController::new(config)
        .run(&mut site)
        .await
        .unwrap();

    assert_eq!(outcome.status, SessionStatus::Done);
    assert_eq!(outcome.dataset.len(), 4);

    let short = &outcome.dataset.records[2];
    assert_eq!(short.get("Name"), Some("Fund 2A"));
    assert_eq!(short.get("NAV"), Some("N/A"));
    assert_eq!(short.get("AUM"), Some("N/A"));

    let wide = &outcome.dataset.records[3];
    assert_eq!(wide.cells().len(), 3);

    // One warning per misshapen row: the padded one and the truncated one.
    assert_eq!(outcome.errors.drift_warnings, 2);
    assert_eq!(outcome.dataset.drift_warnings, 2);
}

#[tokio::test]
async fn test_cancellation_preserves_partial_dataset() {
    let controller = PaginationController::new(fast_config(3));
    let mut site = MockSite::new(listing(3));
    site.cancel_on_advance = Some(controller.cancel_handle());

    let outcome = controller.run(&mut site).await.unwrap();

    assert_eq!(outcome.status, SessionStatus::Cancelled);
    assert_eq!(outcome.dataset.len(), 2);
    assert!(outcome
        .dataset
        .records
        .iter()
        .all(|r| r.page_number == 1));
    assert!(site.closed);
}

#[tokio::test]
async fn test_navigation_failure_fails_with_empty_dataset() {
    let mut site = MockSite::new(listing(2));
    site.refuse_navigation = true;

    let outcome = PaginationController::new(fast_config(2))
        .run(&mut site)
        .await
        .unwrap();

    assert_eq!(outcome.status, SessionStatus::Failed);
    assert!(outcome.dataset.is_empty());
    assert_eq!(outcome.stats.pages_fetched, 0);
    assert_eq!(outcome.errors.entries.len(), 1);
    assert_eq!(outcome.errors.entries[0].page_number, 1);
    assert_eq!(outcome.errors.entries[0].kind, "retry_exhausted");
    assert!(site.closed);
}

#[tokio::test]
async fn test_missing_table_on_first_page_is_fatal() {
    let mut site = MockSite::new(listing(2));
    site.missing_table = true;

    let outcome = PaginationController::new(fast_config(3))
        .run(&mut site)
        .await
        .unwrap();

    assert_eq!(outcome.status, SessionStatus::Failed);
    assert!(outcome.dataset.is_empty());
    // No schema yet, so the missing table short-circuits without retries.
    assert_eq!(outcome.stats.retries, 0);
    assert_eq!(site.fetches, 1);
    assert_eq!(outcome.errors.entries[0].kind, "extraction");
    assert!(site.closed);
}

#[tokio::test]
async fn test_empty_table_is_a_valid_page() {
    let mut site = MockSite::new(vec![TableData::new(
        vec!["Name".into(), "NAV".into(), "AUM".into()],
        vec![],
    )]);
    let outcome = PaginationController::new(fast_config(3))
        .run(&mut site)
        .await
        .unwrap();

    assert_eq!(outcome.status, SessionStatus::Done);
    assert!(outcome.dataset.is_empty());
    assert_eq!(outcome.stats.pages_fetched, 1);
    assert!(outcome.errors.is_clean());
}

#[tokio::test]
async fn test_runs_are_stable_modulo_timestamps() {
    let first = PaginationController::new(fast_config(3))
        .run(&mut MockSite::new(listing(2)))
        .await
        .unwrap();
    let second = PaginationController::new(fast_config(3))
        .run(&mut MockSite::new(listing(2)))
        .await
        .unwrap();

    assert_eq!(first.dataset.len(), second.dataset.len());
    for (a, b) in first
        .dataset
        .records
        .iter()
        .zip(second.dataset.records.iter())
    {
        assert_eq!(a.cells(), b.cells());
        assert_eq!(a.page_number, b.page_number);
    }
}
