//! Next-page detection strategies
//!
//! "Next page" on a dynamically rendered listing is a stateful UI action,
//! not an addressable URL offset, and the markup that exposes it is
//! site-specific and brittle. The controller therefore evaluates an
//! ordered, swappable list of [`NextPageStrategy`] implementations against
//! the rendering capability; the first strategy that manages to advance
//! wins, and no match at all means the traversal is done.

mod strategies;

pub use strategies::{NextControlStrategy, PageIndexStrategy};

use crate::error::Result;
use crate::render::RenderSession;
use async_trait::async_trait;

/// Outcome of one strategy's advance attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The strategy performed a page advance
    Advanced,
    /// The strategy found nothing to act on; try the next one
    NoMatch,
}

impl Advance {
    /// Check if a page advance was performed
    pub fn advanced(&self) -> bool {
        matches!(self, Self::Advanced)
    }
}

/// One way of detecting and performing a next-page transition
#[async_trait]
pub trait NextPageStrategy: Send + Sync {
    /// Strategy name, for logging
    fn name(&self) -> &'static str;

    /// Try to advance to the next page through the rendering capability
    async fn advance(&self, session: &mut dyn RenderSession) -> Result<Advance>;
}

/// The default strategy list, in priority order: an enabled "next" control
/// first, then page-index arithmetic.
pub fn default_strategies() -> Vec<Box<dyn NextPageStrategy>> {
    vec![
        Box::new(NextControlStrategy::default()),
        Box::new(PageIndexStrategy::default()),
    ]
}
