//! Append-only dataset accumulation
//!
//! [`DatasetAccumulator`] aggregates per-page results into the final
//! ordered dataset. It enforces the session's central ordering invariant:
//! page numbers are strictly increasing with no gaps, so total row order
//! equals (page number asc, in-page order) and no page is ever lost or
//! duplicated.

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::types::{FundRecord, PageResult};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The finalized output of a session: schema plus ordered records.
///
/// `schema` is `None` only when the session failed before the first page
/// could establish one.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Schema shared by all records, if one was established
    pub schema: Option<Arc<Schema>>,
    /// All accepted records, in (page asc, in-page) order
    pub records: Vec<FundRecord>,
    /// Total schema drift warnings observed while accumulating
    pub drift_warnings: u32,
}

impl Dataset {
    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the dataset holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flatten every record into a JSON object (columns plus metadata)
    pub fn to_json_rows(&self) -> Vec<Value> {
        self.records.iter().map(FundRecord::to_json).collect()
    }
}

/// Accumulates page results for one session
#[derive(Debug, Default)]
pub struct DatasetAccumulator {
    schema: Option<Arc<Schema>>,
    records: Vec<FundRecord>,
    last_page: u32,
    drift_warnings: u32,
    finalized: bool,
}

impl DatasetAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the session schema once established
    pub fn set_schema(&mut self, schema: Arc<Schema>) {
        self.schema = Some(schema);
    }

    /// Append one page's records.
    ///
    /// Rejects any page whose number is not exactly `last_accepted + 1`;
    /// under correct controller logic this cannot happen, so a rejection
    /// is an invariant breach, not an expected failure mode.
    pub fn append(&mut self, page: PageResult) -> Result<()> {
        if self.finalized {
            return Err(Error::DatasetFinalized {
                page: page.page_number,
            });
        }

        let expected = self.last_page + 1;
        if page.page_number != expected {
            return Err(Error::ordering(expected, page.page_number));
        }

        debug!(
            page_number = page.page_number,
            records = page.len(),
            drift_warnings = page.drift_warnings,
            "page accepted"
        );

        self.last_page = page.page_number;
        self.drift_warnings += page.drift_warnings;
        self.records.extend(page.records);
        Ok(())
    }

    /// Highest page number accepted so far (0 before any page)
    pub fn last_page(&self) -> u32 {
        self.last_page
    }

    /// Records accepted so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing has been accepted yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Schema drift warnings accumulated so far
    pub fn drift_warnings(&self) -> u32 {
        self.drift_warnings
    }

    /// Freeze and hand off the dataset.
    ///
    /// Idempotent: repeated calls return the same dataset; appends after
    /// the first call are rejected.
    pub fn finalize(&mut self) -> Dataset {
        self.finalized = true;
        Dataset {
            schema: self.schema.clone(),
            records: self.records.clone(),
            drift_warnings: self.drift_warnings,
        }
    }
}
