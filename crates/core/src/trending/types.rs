//! Types for trending aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::MovieSummary;

/// Aggregated search activity for a single query text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingEntry {
    /// Query text exactly as submitted (case-sensitive).
    pub query: String,
    /// Number of successful non-empty searches for this query (>= 1).
    pub hit_count: u32,
    /// First result ever matched for this query.
    pub representative: MovieSummary,
    /// When the query was first recorded.
    pub first_seen_at: DateTime<Utc>,
    /// When the counter last changed.
    pub updated_at: DateTime<Utc>,
}

/// Top-N trending entries, ordered by hit count descending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrendingRanking {
    entries: Vec<TrendingEntry>,
}

impl TrendingRanking {
    /// Build a ranking from store records.
    ///
    /// Sorting is stable, so entries with equal hit counts keep the order
    /// the store returned them in.
    pub fn from_entries(mut entries: Vec<TrendingEntry>, top_n: usize) -> Self {
        entries.sort_by(|a, b| b.hit_count.cmp(&a.hit_count));
        entries.truncate(top_n);
        Self { entries }
    }

    pub fn entries(&self) -> &[TrendingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries with their 1-based rank.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &TrendingEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }
}

/// Errors for trending operations.
#[derive(Debug, Error)]
pub enum TrendingError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
