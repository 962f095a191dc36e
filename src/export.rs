//! Dataset export to CSV and JSON files
//!
//! Serialization lives outside the extraction core; these writers accept
//! a finalized [`Dataset`] and nothing else. Each write produces a
//! timestamped file plus a `funds_latest.*` copy so downstream consumers
//! have a stable path to poll.

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::types::{PAGE_NUMBER_COLUMN, SCRAPED_AT_COLUMN};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// BOM keeps spreadsheet tools reading the CSV as UTF-8.
const UTF8_BOM: &str = "\u{feff}";

fn timestamped(dir: &Path, extension: &str) -> (PathBuf, PathBuf) {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    (
        dir.join(format!("funds_{stamp}.{extension}")),
        dir.join(format!("funds_latest.{extension}")),
    )
}

fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Write the dataset as CSV into `dir`, returning the timestamped path.
///
/// Columns are the schema columns in order, then `scraped_at` and
/// `page_number`.
pub fn write_csv(dataset: &Dataset, dir: &Path) -> Result<PathBuf> {
    let schema = dataset
        .schema
        .as_ref()
        .ok_or_else(|| Error::export("dataset has no schema; nothing to write"))?;

    let mut out = String::from(UTF8_BOM);
    let header: Vec<String> = schema
        .columns()
        .iter()
        .map(|c| csv_escape(c))
        .chain([SCRAPED_AT_COLUMN.to_string(), PAGE_NUMBER_COLUMN.to_string()])
        .collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for record in &dataset.records {
        let row: Vec<String> = record
            .cells()
            .iter()
            .map(|c| csv_escape(c))
            .chain([
                record.scraped_at.to_rfc3339(),
                record.page_number.to_string(),
            ])
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    fs::create_dir_all(dir)?;
    let (path, latest) = timestamped(dir, "csv");
    fs::write(&path, &out)?;
    fs::write(&latest, &out)?;

    info!(path = %path.display(), records = dataset.len(), "wrote CSV export");
    Ok(path)
}

/// Write the dataset as a pretty-printed JSON array of flat records into
/// `dir`, returning the timestamped path
pub fn write_json(dataset: &Dataset, dir: &Path) -> Result<PathBuf> {
    let rows = dataset.to_json_rows();
    let out = serde_json::to_string_pretty(&rows)?;

    fs::create_dir_all(dir)?;
    let (path, latest) = timestamped(dir, "json");
    fs::write(&path, &out)?;
    fs::write(&latest, &out)?;

    info!(path = %path.display(), records = dataset.len(), "wrote JSON export");
    Ok(path)
}
