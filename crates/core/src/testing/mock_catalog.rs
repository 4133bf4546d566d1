//! Mock movie catalog for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, CatalogMode, CatalogRequest, MovieCatalog, MovieSummary};

/// A recorded catalog request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    pub query: String,
    pub mode: CatalogMode,
}

/// Mock implementation of the MovieCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable results per query (empty query = discover listing)
/// - Delay responses per query to simulate out-of-order completion
/// - Track requests for assertions
/// - Simulate failures
#[derive(Debug, Default)]
pub struct MockCatalog {
    /// Results by exact query text.
    results: Arc<RwLock<HashMap<String, Vec<MovieSummary>>>>,
    /// Response latency by exact query text.
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Errors returned for a query on every call.
    failures: Arc<RwLock<HashMap<String, fn() -> CatalogError>>>,
    /// Recorded requests, in the order they were issued.
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    /// If set, the next request will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
}

impl MockCatalog {
    /// Create a new mock catalog that returns empty pages.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the results returned for `query`.
    pub async fn set_results(&self, query: &str, movies: Vec<MovieSummary>) {
        self.results.write().await.insert(query.to_string(), movies);
    }

    /// Delay responses for `query`.
    pub async fn set_delay(&self, query: &str, delay: Duration) {
        self.delays.write().await.insert(query.to_string(), delay);
    }

    /// Make every request for `query` fail with the error built by `make_error`.
    pub async fn set_failure(&self, query: &str, make_error: fn() -> CatalogError) {
        self.failures
            .write()
            .await
            .insert(query.to_string(), make_error);
    }

    /// Clear a configured failure for `query`.
    pub async fn clear_failure(&self, query: &str) {
        self.failures.write().await.remove(query);
    }

    // =========================================================================
    // Request Recording
    // =========================================================================

    /// Get all recorded requests.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Get the number of requests performed.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    /// Number of requests performed for `query`.
    pub async fn fetch_count_for(&self, query: &str) -> usize {
        self.fetches
            .read()
            .await
            .iter()
            .filter(|f| f.query == query)
            .count()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next request to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl MovieCatalog for MockCatalog {
    async fn fetch_catalog(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        self.fetches.write().await.push(RecordedFetch {
            query: query.to_string(),
            mode: CatalogRequest::for_query(query).mode(),
        });

        let delay = self.delays.read().await.get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        if let Some(make_error) = self.failures.read().await.get(query) {
            return Err(make_error());
        }

        Ok(self
            .results
            .read()
            .await
            .get(query)
            .cloned()
            .unwrap_or_default())
    }
}
