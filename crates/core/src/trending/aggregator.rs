//! Records search hits and reads the trending ranking.

use std::sync::Arc;

use tracing::debug;

use super::{AnalyticsStore, TrendingEntry, TrendingError, TrendingRanking};
use crate::catalog::MovieSummary;
use crate::metrics::{TRENDING_HITS, TRENDING_READS};

/// Turns raw search events into a ranked trending list.
///
/// Errors are returned to the caller; the search orchestrator decides to
/// log and swallow them.
#[derive(Clone)]
pub struct TrendingAggregator {
    store: Arc<dyn AnalyticsStore>,
    top_n: usize,
}

impl TrendingAggregator {
    pub fn new(store: Arc<dyn AnalyticsStore>, top_n: usize) -> Self {
        Self { store, top_n }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Record one hit for `query` with its top result.
    ///
    /// Each call increments by exactly one. The representative item is only
    /// stored the first time a query is seen.
    pub async fn record_hit(
        &self,
        query: &str,
        top_result: &MovieSummary,
    ) -> Result<TrendingEntry, TrendingError> {
        if query.is_empty() {
            return Err(TrendingError::InvalidQuery(
                "cannot record a hit for an empty query".to_string(),
            ));
        }

        match self.store.increment(query, top_result).await {
            Ok(entry) => {
                TRENDING_HITS.with_label_values(&["success"]).inc();
                debug!(
                    "Recorded trending hit: query='{}', hit_count={}",
                    entry.query, entry.hit_count
                );
                Ok(entry)
            }
            Err(e) => {
                TRENDING_HITS.with_label_values(&["failed"]).inc();
                Err(e)
            }
        }
    }

    /// Current trending ranking, at most `top_n` entries.
    pub async fn get_trending(&self) -> Result<TrendingRanking, TrendingError> {
        match self.store.top(self.top_n).await {
            Ok(entries) => {
                TRENDING_READS.with_label_values(&["success"]).inc();
                Ok(TrendingRanking::from_entries(entries, self.top_n))
            }
            Err(e) => {
                TRENDING_READS.with_label_values(&["failed"]).inc();
                Err(e)
            }
        }
    }
}
