//! Rendering capability interface
//!
//! The extraction core never talks to a browser directly. It consumes the
//! [`RenderSession`] trait: navigate, bounded waits for content markers,
//! table reads, and the control probes the next-page strategies need. Any
//! rendering technology that can implement this contract works; the
//! [`chromium`] submodule provides the headless-Chrome backend.
//!
//! One session owns one `RenderSession` handle for its whole lifetime and
//! closes it on every exit path.

pub mod chromium;

use crate::error::Result;
use crate::types::TableData;
use async_trait::async_trait;
use std::time::Duration;

/// Observed state of a page control (e.g. a "next" button)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// Present and interactable
    Enabled,
    /// Present but disabled (directly or via a disabled ancestor)
    Disabled,
    /// Not found in the document
    Missing,
}

impl ControlState {
    /// Check if the control can be clicked
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// A live rendered-page session.
///
/// All waits must be bounded; exceeding a bound surfaces as a transient
/// [`Error::Timeout`](crate::Error::Timeout), never an unbounded hang.
/// Advancing pages is a stateful UI action, so implementations are driven
/// strictly sequentially through `&mut self`.
#[async_trait]
pub trait RenderSession: Send {
    /// Load the given URL
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Wait until the content marker (a selector) is present, up to
    /// `timeout`
    async fn wait_for_ready(&mut self, marker: &str, timeout: Duration) -> Result<()>;

    /// Read the current table.
    ///
    /// Returns `Ok(None)` when the table container cannot be located at
    /// all; an empty `TableData` is a valid zero-row page, not an error.
    async fn read_table(&mut self) -> Result<Option<TableData>>;

    /// Probe the state of a control identified by a selector
    async fn find_control(&mut self, selector: &str) -> Result<ControlState>;

    /// Read the trimmed inner text of the first element matching the
    /// selector, if any
    async fn read_text(&mut self, selector: &str) -> Result<Option<String>>;

    /// Click the first element matching the selector
    async fn click(&mut self, selector: &str) -> Result<()>;

    /// Release the underlying rendering resources. Called exactly once by
    /// the controller on every exit path.
    async fn close(&mut self) -> Result<()>;
}
