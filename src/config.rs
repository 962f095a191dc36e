//! Session configuration
//!
//! All knobs are passed in by the caller; the crate reads no global state.
//! Configs deserialize from YAML the same way they are built in code, so
//! an orchestration layer can keep them in files.

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

fn default_ready_marker() -> String {
    "table".to_string()
}

fn default_step_timeout_ms() -> u64 {
    30_000
}

fn default_settle_delay_ms() -> u64 {
    3_000
}

fn default_max_pages() -> u32 {
    100
}

/// Configuration for one scrape session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Listing URL to start from
    pub url: String,

    /// Selector whose presence marks the page content as ready
    #[serde(default = "default_ready_marker")]
    pub ready_marker: String,

    /// Bound on every wait-for-content and navigation step, in
    /// milliseconds
    #[serde(default = "default_step_timeout_ms")]
    pub step_timeout_ms: u64,

    /// Wait after a page advance for dynamic content to settle, in
    /// milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Safety ceiling on the number of pages traversed
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Marker written into columns a short row did not provide
    #[serde(default)]
    pub absent_marker: String,

    /// Retry budget and backoff schedule for fetch/extract steps
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ScrapeConfig {
    /// Create a config for the given URL with defaults everywhere else
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ready_marker: default_ready_marker(),
            step_timeout_ms: default_step_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            max_pages: default_max_pages(),
            absent_marker: String::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Set the ready marker
    #[must_use]
    pub fn with_ready_marker(mut self, marker: impl Into<String>) -> Self {
        self.ready_marker = marker.into();
        self
    }

    /// Set the per-step timeout
    #[must_use]
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the post-advance settle delay
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the page ceiling
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the absent marker
    #[must_use]
    pub fn with_absent_marker(mut self, marker: impl Into<String>) -> Self {
        self.absent_marker = marker.into();
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Per-step timeout as a duration
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    /// Settle delay as a duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Load a config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Check the config for values a session cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::config("url must not be empty"));
        }
        if self.max_pages == 0 {
            return Err(Error::config("max_pages must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScrapeConfig::new("https://example.com/funds");
        assert_eq!(config.ready_marker, "table");
        assert_eq!(config.step_timeout(), Duration::from_secs(30));
        assert_eq!(config.settle_delay(), Duration::from_secs(3));
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_minimal() {
        let config = ScrapeConfig::from_yaml_str("url: https://example.com/funds\n").unwrap();
        assert_eq!(config.url, "https://example.com/funds");
        assert_eq!(config.max_pages, 100);
    }

    #[test]
    fn test_from_yaml_full() {
        let yaml = r"
url: https://example.com/funds
ready_marker: 'table tbody tr'
step_timeout_ms: 10000
settle_delay_ms: 500
max_pages: 20
absent_marker: 'N/A'
retry:
  max_attempts: 5
  backoff: linear
  initial_delay_ms: 200
  max_delay_ms: 5000
";
        let config = ScrapeConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.ready_marker, "table tbody tr");
        assert_eq!(config.max_pages, 20);
        assert_eq!(config.absent_marker, "N/A");
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ScrapeConfig::new("").validate().is_err());
        assert!(ScrapeConfig::new("https://x").with_max_pages(0).validate().is_err());

        let mut config = ScrapeConfig::new("https://x");
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
