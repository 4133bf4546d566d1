//! Trending aggregation.
//!
//! Every successful non-empty search records a "hit" for its query text in
//! the analytics store. The trending ranking is the top-N queries by hit
//! count, each shown with the first movie ever matched for that query.

mod aggregator;
mod sqlite;
mod types;

pub use aggregator::TrendingAggregator;
pub use sqlite::SqliteAnalyticsStore;
pub use types::*;

use async_trait::async_trait;

use crate::catalog::MovieSummary;

/// Trait for the analytics store that persists per-query hit counts.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Increment the counter for `query`, creating the record if needed.
    ///
    /// On creation the record starts at 1 with `representative` as its item.
    /// On update only the counter and update time change; the stored
    /// representative is kept.
    async fn increment(
        &self,
        query: &str,
        representative: &MovieSummary,
    ) -> Result<TrendingEntry, TrendingError>;

    /// Read up to `limit` records ordered by counter descending.
    ///
    /// Ties are broken by most recent update first.
    async fn top(&self, limit: usize) -> Result<Vec<TrendingEntry>, TrendingError>;
}
