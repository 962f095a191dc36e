//! Error types for fundscrape
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Failures split into two classes: transient failures are expected to
//! self-resolve under retry (timeouts, content not yet rendered), fatal
//! failures abort the session while preserving partial results. Schema
//! drift is deliberately *not* an error; it is a counted warning on the
//! session's error summary.

use thiserror::Error;

/// The main error type for fundscrape
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Navigation / rendering errors
    // ============================================================================
    #[error("Navigation failed: {message}")]
    Navigation { message: String },

    #[error("Timed out after {timeout_ms}ms waiting for {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("Rendering backend error: {message}")]
    Render { message: String },

    // ============================================================================
    // Extraction errors
    // ============================================================================
    #[error("Extraction failed: {message}")]
    Extraction { message: String },

    #[error("Schema establishment failed: {message}")]
    SchemaEstablishment { message: String },

    // ============================================================================
    // Retry / invariant errors
    // ============================================================================
    #[error("Retry budget exhausted after {attempts} attempts: {last}")]
    RetryExhausted { attempts: u32, last: String },

    #[error("Page ordering violation: expected page {expected}, got {got}")]
    OrderingViolation { expected: u32, got: u32 },

    #[error("Dataset already finalized; append of page {page} rejected")]
    DatasetFinalized { page: u32 },

    // ============================================================================
    // Configuration errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // I/O and generic errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a navigation error
    pub fn navigation(message: impl Into<String>) -> Self {
        Self::Navigation {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(what: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            what: what.into(),
            timeout_ms,
        }
    }

    /// Create a rendering backend error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    /// Create a schema establishment error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaEstablishment {
            message: message.into(),
        }
    }

    /// Create a retry-exhausted error from the last failure seen
    pub fn retry_exhausted(attempts: u32, last: &Error) -> Self {
        Self::RetryExhausted {
            attempts,
            last: last.to_string(),
        }
    }

    /// Create an ordering violation error
    pub fn ordering(expected: u32, got: u32) -> Self {
        Self::OrderingViolation { expected, got }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an export error
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Check if this error is transient, i.e. worth retrying.
    ///
    /// `Extraction` defaults to transient; the controller overrides the
    /// classification to fatal on the schema-establishing page, where a
    /// missing table cannot be trusted to appear later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Navigation { .. }
                | Error::Timeout { .. }
                | Error::Render { .. }
                | Error::Extraction { .. }
        )
    }

    /// Stable snake_case tag for this error, used in error summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Navigation { .. } => "navigation",
            Error::Timeout { .. } => "timeout",
            Error::Render { .. } => "render",
            Error::Extraction { .. } => "extraction",
            Error::SchemaEstablishment { .. } => "schema_establishment",
            Error::RetryExhausted { .. } => "retry_exhausted",
            Error::OrderingViolation { .. } => "ordering_violation",
            Error::DatasetFinalized { .. } => "dataset_finalized",
            Error::Config { .. } => "config",
            Error::Export { .. } => "export",
            Error::YamlParse(_) => "yaml",
            Error::JsonParse(_) => "json",
            Error::Io(_) => "io",
            Error::Anyhow(_) => "other",
        }
    }
}

/// Result type alias for fundscrape
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::navigation("page failed to load");
        assert_eq!(err.to_string(), "Navigation failed: page failed to load");

        let err = Error::timeout("table marker", 30_000);
        assert_eq!(
            err.to_string(),
            "Timed out after 30000ms waiting for table marker"
        );

        let err = Error::ordering(3, 5);
        assert_eq!(
            err.to_string(),
            "Page ordering violation: expected page 3, got 5"
        );
    }

    #[test]
    fn test_is_transient() {
        assert!(Error::navigation("slow").is_transient());
        assert!(Error::timeout("table", 1000).is_transient());
        assert!(Error::render("cdp hiccup").is_transient());
        assert!(Error::extraction("table not found").is_transient());

        assert!(!Error::schema("no header cells").is_transient());
        assert!(!Error::ordering(2, 4).is_transient());
        assert!(!Error::config("bad yaml").is_transient());
        assert!(!Error::retry_exhausted(3, &Error::navigation("slow")).is_transient());
    }

    #[test]
    fn test_retry_exhausted_carries_last_error() {
        let last = Error::timeout("table marker", 500);
        let err = Error::retry_exhausted(3, &last);
        assert_eq!(err.kind(), "retry_exhausted");
        assert!(err.to_string().contains("after 3 attempts"));
        assert!(err.to_string().contains("table marker"));
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(Error::navigation("x").kind(), "navigation");
        assert_eq!(Error::extraction("x").kind(), "extraction");
        assert_eq!(Error::schema("x").kind(), "schema_establishment");
        assert_eq!(Error::ordering(1, 2).kind(), "ordering_violation");
    }
}
