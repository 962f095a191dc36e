//! Built-in next-page strategies

use super::{Advance, NextPageStrategy};
use crate::error::Result;
use crate::render::{ControlState, RenderSession};
use async_trait::async_trait;
use tracing::debug;

/// Candidate selectors for a generic "next" control, most specific first.
/// Selector dialect is the rendering backend's concern.
const NEXT_CONTROL_SELECTORS: &[&str] = &[
    r#"a.page-link:has-text("Next")"#,
    r#"button:has-text("Next")"#,
    r#"a:has-text("›")"#,
    r#"button:has-text("›")"#,
    "a.next",
    "button.next",
    "li.next a",
    "li.pagination-next a",
    r#"[aria-label="Next"]"#,
    ".pagination .next:not(.disabled) a",
];

/// Default selector matching the active page-index control
const ACTIVE_PAGE_SELECTOR: &str = ".pagination .active, .page-item.active";

/// Default template for the link to a specific page number
const PAGE_LINK_TEMPLATE: &str = r#"a.page-link:has-text("{page}")"#;

// ============================================================================
// Next control
// ============================================================================

/// Clicks the first enabled control from an ordered candidate list.
///
/// A control that exists but is disabled is the listing's "last page"
/// marker; it yields [`Advance::NoMatch`] rather than an error.
#[derive(Debug, Clone)]
pub struct NextControlStrategy {
    selectors: Vec<String>,
}

impl Default for NextControlStrategy {
    fn default() -> Self {
        Self {
            selectors: NEXT_CONTROL_SELECTORS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl NextControlStrategy {
    /// Create a strategy over a custom selector list
    pub fn new(selectors: Vec<String>) -> Self {
        Self { selectors }
    }
}

#[async_trait]
impl NextPageStrategy for NextControlStrategy {
    fn name(&self) -> &'static str {
        "next_control"
    }

    async fn advance(&self, session: &mut dyn RenderSession) -> Result<Advance> {
        for selector in &self.selectors {
            match session.find_control(selector).await? {
                ControlState::Enabled => {
                    debug!(selector, "clicking next control");
                    session.click(selector).await?;
                    return Ok(Advance::Advanced);
                }
                ControlState::Disabled => {
                    debug!(selector, "next control disabled");
                }
                ControlState::Missing => {}
            }
        }
        Ok(Advance::NoMatch)
    }
}

// ============================================================================
// Page index
// ============================================================================

/// Reads the active page-index control, computes `n + 1` and clicks the
/// link carrying that number.
#[derive(Debug, Clone)]
pub struct PageIndexStrategy {
    active_selector: String,
    link_template: String,
}

impl Default for PageIndexStrategy {
    fn default() -> Self {
        Self {
            active_selector: ACTIVE_PAGE_SELECTOR.to_string(),
            link_template: PAGE_LINK_TEMPLATE.to_string(),
        }
    }
}

impl PageIndexStrategy {
    /// Create a strategy with a custom active-page selector and link
    /// template (`{page}` is replaced with the target page number)
    pub fn new(active_selector: impl Into<String>, link_template: impl Into<String>) -> Self {
        Self {
            active_selector: active_selector.into(),
            link_template: link_template.into(),
        }
    }
}

#[async_trait]
impl NextPageStrategy for PageIndexStrategy {
    fn name(&self) -> &'static str {
        "page_index"
    }

    async fn advance(&self, session: &mut dyn RenderSession) -> Result<Advance> {
        let Some(text) = session.read_text(&self.active_selector).await? else {
            return Ok(Advance::NoMatch);
        };
        let Ok(current) = text.trim().parse::<u32>() else {
            return Ok(Advance::NoMatch);
        };

        let target = self.link_template.replace("{page}", &(current + 1).to_string());
        match session.find_control(&target).await? {
            ControlState::Enabled => {
                debug!(page = current + 1, "clicking page-index link");
                session.click(&target).await?;
                Ok(Advance::Advanced)
            }
            _ => Ok(Advance::NoMatch),
        }
    }
}
