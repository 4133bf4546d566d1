//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits,
//! allowing orchestrator and server tests without a real catalog or store.
//!
//! # Example
//!
//! ```rust,ignore
//! use cinescout_core::testing::{fixtures, MockAnalyticsStore, MockCatalog};
//!
//! let catalog = MockCatalog::new();
//! catalog.set_results("batman", vec![fixtures::movie(268, "Batman")]).await;
//! catalog.set_delay("batman", Duration::from_millis(500)).await;
//!
//! let store = MockAnalyticsStore::new();
//! store.set_failing(true).await;
//! ```

mod mock_analytics_store;
mod mock_catalog;

pub use mock_analytics_store::MockAnalyticsStore;
pub use mock_catalog::MockCatalog;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::MovieSummary;

    /// Create a test movie with reasonable defaults.
    pub fn movie(id: u64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            poster_path: Some(format!("/poster-{}.jpg", id)),
            vote_average: Some(7.5),
            original_language: Some("en".to_string()),
            release_date: Some("2024-06-15".to_string()),
        }
    }

    /// Create `count` movies whose titles start with `prefix`.
    pub fn movies(prefix: &str, count: u64) -> Vec<MovieSummary> {
        (1..=count)
            .map(|i| movie(i, &format!("{} {}", prefix, i)))
            .collect()
    }
}
