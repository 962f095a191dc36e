//! Turning one rendered table snapshot into a schema-tagged row set
//!
//! The [`ExtractionEngine`] maps raw rows positionally onto the session
//! [`Schema`]. Short rows are padded with an explicit absent marker rather
//! than silently dropped; long rows are truncated. Either shape mismatch
//! counts as schema drift. Placeholder rows the listing renders while
//! loading are skipped.

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::types::{FundRecord, PageResult, TableData};
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration and logic for per-page extraction
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    absent_marker: String,
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionEngine {
    /// Create an engine with the default (empty-string) absent marker
    pub fn new() -> Self {
        Self {
            absent_marker: String::new(),
        }
    }

    /// Set the marker written into columns a short row did not provide
    #[must_use]
    pub fn with_absent_marker(mut self, marker: impl Into<String>) -> Self {
        self.absent_marker = marker.into();
        self
    }

    /// The configured absent marker
    pub fn absent_marker(&self) -> &str {
        &self.absent_marker
    }

    /// Establish the session schema from a first-page snapshot.
    ///
    /// Fatal when no usable header cells exist; a table with no
    /// discoverable schema cannot be trusted.
    pub fn establish_schema(&self, table: &TableData) -> Result<Arc<Schema>> {
        let schema = Arc::new(Schema::from_headers(&table.headers)?);
        debug!(columns = schema.len(), "established schema");
        Ok(schema)
    }

    /// Extract all rows of a snapshot into records bound to `schema`.
    ///
    /// Never fails: shape mismatches degrade to padding/truncation with
    /// drift warnings counted on the returned [`PageResult`]. A snapshot
    /// with zero usable rows yields a valid empty page.
    pub fn extract_page(
        &self,
        table: &TableData,
        schema: &Arc<Schema>,
        page_number: u32,
    ) -> PageResult {
        let width = schema.len();
        let mut records = Vec::with_capacity(table.rows.len());
        let mut drift_warnings = 0u32;

        for row in &table.rows {
            // Loading placeholders render as rows with no real cell
            // content.
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let mut cells = row.clone();
            if cells.len() > width {
                warn!(
                    page_number,
                    row_cells = cells.len(),
                    schema_cells = width,
                    "row wider than schema, truncating"
                );
                cells.truncate(width);
                drift_warnings += 1;
            } else if cells.len() < width {
                warn!(
                    page_number,
                    row_cells = cells.len(),
                    schema_cells = width,
                    "row narrower than schema, padding"
                );
                cells.resize(width, self.absent_marker.clone());
                drift_warnings += 1;
            }

            records.push(FundRecord::new(Arc::clone(schema), cells, page_number));
        }

        debug!(page_number, records = records.len(), "extracted page");

        let mut result = PageResult::new(page_number, records);
        result.drift_warnings = drift_warnings;
        result
    }

    /// Convenience for the controller's per-page fetch step: reject a
    /// missing table container as an extraction failure, keeping the
    /// "missing table" vs "empty table" distinction out of the happy path.
    pub fn require_table(table: Option<TableData>) -> Result<TableData> {
        table.ok_or_else(|| Error::extraction("table container not found after ready signal"))
    }
}
