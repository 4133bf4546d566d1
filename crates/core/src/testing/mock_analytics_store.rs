//! Mock analytics store for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::MovieSummary;
use crate::trending::{AnalyticsStore, TrendingEntry, TrendingError};

/// In-memory implementation of the AnalyticsStore trait.
///
/// Mirrors the SQLite store's ordering (hit count, then most recent write)
/// and can be switched into a failing mode to simulate an unreachable store.
#[derive(Debug, Default)]
pub struct MockAnalyticsStore {
    /// Entries with the write sequence of their last update.
    entries: Arc<RwLock<HashMap<String, (TrendingEntry, u64)>>>,
    /// Monotonic write counter.
    seq: Arc<RwLock<u64>>,
    /// When true, every operation fails.
    failing: Arc<RwLock<bool>>,
}

impl MockAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle failure mode.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    /// Number of distinct queries stored.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Look up a stored entry by query.
    pub async fn entry(&self, query: &str) -> Option<TrendingEntry> {
        self.entries.read().await.get(query).map(|(e, _)| e.clone())
    }

    async fn check_failing(&self) -> Result<(), TrendingError> {
        if *self.failing.read().await {
            return Err(TrendingError::Database(
                "analytics store unreachable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AnalyticsStore for MockAnalyticsStore {
    async fn increment(
        &self,
        query: &str,
        representative: &MovieSummary,
    ) -> Result<TrendingEntry, TrendingError> {
        self.check_failing().await?;

        let seq = {
            let mut seq = self.seq.write().await;
            *seq += 1;
            *seq
        };
        let now = Utc::now();

        let mut entries = self.entries.write().await;
        let (entry, entry_seq) = entries.entry(query.to_string()).or_insert_with(|| {
            (
                TrendingEntry {
                    query: query.to_string(),
                    hit_count: 0,
                    representative: representative.clone(),
                    first_seen_at: now,
                    updated_at: now,
                },
                seq,
            )
        });
        entry.hit_count += 1;
        entry.updated_at = now;
        *entry_seq = seq;

        Ok(entry.clone())
    }

    async fn top(&self, limit: usize) -> Result<Vec<TrendingEntry>, TrendingError> {
        self.check_failing().await?;

        let entries = self.entries.read().await;
        let mut all: Vec<_> = entries.values().cloned().collect();
        all.sort_by(|(a, a_seq), (b, b_seq)| {
            b.hit_count.cmp(&a.hit_count).then(b_seq.cmp(a_seq))
        });
        Ok(all.into_iter().take(limit).map(|(e, _)| e).collect())
    }
}
