//! Common types used throughout fundscrape
//!
//! Shared data-model types: the raw table snapshot handed over by the
//! rendering capability, the extracted record and page types, and the
//! session-level status and error summary.

use crate::schema::Schema;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Metadata column stamped on every record: extraction timestamp
pub const SCRAPED_AT_COLUMN: &str = "scraped_at";

/// Metadata column stamped on every record: 1-based source page
pub const PAGE_NUMBER_COLUMN: &str = "page_number";

// ============================================================================
// Table snapshot
// ============================================================================

/// Raw table content read from a rendered page.
///
/// Cell values are plain strings; type coercion is deliberately deferred to
/// downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    /// Header cells, in document order
    pub headers: Vec<String>,
    /// Body rows, each an ordered list of cell values
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    /// Create a table snapshot from headers and rows
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Check if the table has no body rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Fund record
// ============================================================================

/// One extracted row, bound to the session schema.
///
/// Cells are stored positionally; `cells.len()` always equals the schema
/// width (short rows are padded at extraction, long rows truncated). Every
/// record of a session holds the same `Arc<Schema>`.
#[derive(Debug, Clone, PartialEq)]
pub struct FundRecord {
    schema: Arc<Schema>,
    cells: Vec<String>,
    /// When this record was extracted
    pub scraped_at: DateTime<Utc>,
    /// 1-based page the record came from
    pub page_number: u32,
}

impl FundRecord {
    /// Create a record. The caller guarantees `cells` is already sized to
    /// the schema width.
    pub fn new(schema: Arc<Schema>, cells: Vec<String>, page_number: u32) -> Self {
        debug_assert_eq!(cells.len(), schema.len());
        Self {
            schema,
            cells,
            scraped_at: Utc::now(),
            page_number,
        }
    }

    /// The schema this record is bound to
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Cell value for a column name, if the column exists in the schema
    pub fn get(&self, column: &str) -> Option<&str> {
        self.schema
            .index_of(column)
            .map(|i| self.cells[i].as_str())
    }

    /// Positional cell values, in schema order
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Iterate `(column, value)` pairs in schema order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(String::as_str))
    }

    /// Flatten into a JSON object: schema columns in order, then the two
    /// metadata fields.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (column, value) in self.columns() {
            map.insert(column.to_string(), Value::String(value.to_string()));
        }
        map.insert(
            SCRAPED_AT_COLUMN.to_string(),
            Value::String(self.scraped_at.to_rfc3339()),
        );
        map.insert(
            PAGE_NUMBER_COLUMN.to_string(),
            Value::Number(self.page_number.into()),
        );
        Value::Object(map)
    }
}

// ============================================================================
// Page result
// ============================================================================

/// Records extracted from one page, plus pagination signals
#[derive(Debug, Clone)]
pub struct PageResult {
    /// 1-based page number this result came from
    pub page_number: u32,
    /// Extracted records, in page order
    pub records: Vec<FundRecord>,
    /// Whether a next page was detected after this one
    pub has_next: bool,
    /// Schema drift warnings raised while extracting this page
    pub drift_warnings: u32,
}

impl PageResult {
    /// Create a page result with pagination signals not yet decided
    pub fn new(page_number: u32, records: Vec<FundRecord>) -> Self {
        Self {
            page_number,
            records,
            has_next: false,
            drift_warnings: 0,
        }
    }

    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the page yielded no records (a valid outcome, distinct from
    /// a missing table container)
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Session status
// ============================================================================

/// Terminal status of a scrape session. Every session ends in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Pagination completed normally
    Done,
    /// A fatal failure aborted the session; partial rows are preserved
    Failed,
    /// The caller cancelled between page iterations; partial rows are
    /// preserved
    Cancelled,
}

impl SessionStatus {
    /// Check if the session completed normally
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ============================================================================
// Error summary
// ============================================================================

/// One recorded failure, attributed to the page it happened on
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    /// Page the failure was attributed to
    pub page_number: u32,
    /// Stable error tag (see `Error::kind`)
    pub kind: String,
    /// Human-readable failure description
    pub message: String,
}

/// Non-propagated failures and warnings collected over a session
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorSummary {
    /// Fatal failures recorded before the session terminated
    pub entries: Vec<ErrorEntry>,
    /// Count of schema drift warnings (row shape disagreeing with the
    /// established schema); never fatal
    pub drift_warnings: u32,
}

impl ErrorSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure against a page
    pub fn record(&mut self, page_number: u32, error: &crate::error::Error) {
        self.entries.push(ErrorEntry {
            page_number,
            kind: error.kind().to_string(),
            message: error.to_string(),
        });
    }

    /// Add schema drift warnings
    pub fn add_drift(&mut self, count: u32) {
        self.drift_warnings += count;
    }

    /// Check if nothing went wrong at all
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty() && self.drift_warnings == 0
    }
}
