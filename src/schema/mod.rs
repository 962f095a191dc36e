//! Runtime schema for scraped tables
//!
//! The column set of the target listing is not known at compile time. A
//! [`Schema`] is established once per session from the first page's header
//! row and is immutable afterwards; every subsequent row is mapped
//! positionally onto it.

use crate::error::{Error, Result};
use serde::Serialize;

/// Ordered column names established from a table header row.
///
/// Immutable once constructed. Shared across all records of a session via
/// `Arc<Schema>` so that every record references the same instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    /// Establish a schema from raw header cells.
    ///
    /// Cleanup mirrors what dynamically rendered listings require in
    /// practice:
    /// - cells are trimmed
    /// - empty trailing columns are dropped
    /// - remaining empty headers are renamed `_empty_0`, `_empty_1`, ...
    ///
    /// Fails with [`Error::SchemaEstablishment`] when no usable columns
    /// remain; a table with no discoverable schema cannot be trusted.
    pub fn from_headers(headers: &[String]) -> Result<Self> {
        let mut columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

        while columns.last().is_some_and(String::is_empty) {
            columns.pop();
        }

        let mut empty_count = 0;
        for column in &mut columns {
            if column.is_empty() {
                *column = format!("_empty_{empty_count}");
                empty_count += 1;
            }
        }

        if columns.is_empty() {
            return Err(Error::schema("no header cells found on first page"));
        }

        Ok(Self { columns })
    }

    /// The ordered column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Check whether a column name is part of the schema
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }
}

#[cfg(test)]
mod tests;
