//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing without a real
//! catalog service or analytics database.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use cinescout_core::{
    testing::{MockAnalyticsStore, MockCatalog},
    AnalyticsConfig, Config, SearchConfig, SearchHandle, SearchOrchestrator, ServerConfig,
    TmdbConfig, TrendingAggregator,
};

/// Re-export fixtures for test convenience
pub use cinescout_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Movie catalog (MockCatalog)
/// - Analytics store (MockAnalyticsStore)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.catalog.set_results("batman", fixtures::movies("Batman", 3)).await;
///
///     let response = fixture.put("/api/v1/search/query", json!({ "query": "batman" })).await;
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure results, delays and failures
    pub catalog: Arc<MockCatalog>,
    /// Mock analytics store - inspect hits or simulate outages
    pub store: Arc<MockAnalyticsStore>,
    /// Handle to the running orchestrator
    pub search: SearchHandle,
    /// Temporary directory for the analytics database path
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    ///
    /// The default listing is configured before the orchestrator starts, so
    /// the initial fetch sees it.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let catalog = Arc::new(MockCatalog::new());
        let store = Arc::new(MockAnalyticsStore::new());

        if let Some(discover) = test_config.discover_results {
            catalog.set_results("", discover).await;
        }

        let config = Config {
            catalog: TmdbConfig {
                api_key: "test-token".to_string(),
                base_url: None,
                image_base_url: None,
                timeout_secs: 30,
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            analytics: AnalyticsConfig {
                database_path: temp_dir.path().join("test.db"),
                top_n: test_config.top_n,
            },
            search: SearchConfig {
                debounce_ms: test_config.debounce_ms,
            },
        };

        let trending = TrendingAggregator::new(
            Arc::clone(&store) as Arc<dyn cinescout_core::AnalyticsStore>,
            config.analytics.top_n,
        );
        let search = SearchOrchestrator::new(
            config.search.clone(),
            Arc::clone(&catalog) as Arc<dyn cinescout_core::MovieCatalog>,
            trending,
        )
        .start();

        let state = Arc::new(cinescout_server::state::AppState::new(
            config,
            search.clone(),
        ));
        let router = cinescout_server::api::create_router(state);

        Self {
            router,
            catalog,
            store,
            search,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with no body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a PUT request with raw string body (for testing malformed JSON).
    pub async fn put_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("PUT")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = self.send(request).await;
        TestResponse {
            status,
            body: parse_json(&bytes),
        }
    }

    /// GET a path and return the body as text (for non-JSON endpoints).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    /// Type a query through the API and wait until its results are shown.
    pub async fn search_for(&self, query: &str) -> Value {
        let response = self
            .put("/api/v1/search/query", serde_json::json!({ "query": query }))
            .await;
        assert_eq!(response.status, StatusCode::ACCEPTED);
        self.wait_for_search(|s| s["settled_query"] == query && s["is_loading"] == false)
            .await
    }

    /// Poll GET /api/v1/search until `predicate` holds.
    pub async fn wait_for_search(&self, mut predicate: impl FnMut(&Value) -> bool) -> Value {
        for _ in 0..500 {
            let response = self.get("/api/v1/search").await;
            if predicate(&response.body) {
                return response.body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Search state never reached the expected shape");
    }

    /// Poll GET /api/v1/trending until `predicate` holds.
    pub async fn wait_for_trending(&self, mut predicate: impl FnMut(&Value) -> bool) -> Value {
        for _ in 0..500 {
            let response = self.get("/api/v1/trending").await;
            if predicate(&response.body) {
                return response.body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Trending never reached the expected shape");
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        let (status, bytes) = self.send(request).await;

        TestResponse {
            status,
            body: parse_json(&bytes),
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, body_bytes.to_vec())
    }
}

fn parse_json(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap_or(Value::Null)
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Debounce window; short so tests run in real time
    pub debounce_ms: u64,
    /// Trending ranking size
    pub top_n: usize,
    /// Results for the default listing shown at startup
    pub discover_results: Option<Vec<cinescout_core::MovieSummary>>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 20,
            top_n: 5,
            discover_results: None,
        }
    }
}

impl TestConfig {
    /// Create config with a populated default listing.
    pub fn with_discover(results: Vec<cinescout_core::MovieSummary>) -> Self {
        Self {
            discover_results: Some(results),
            ..Default::default()
        }
    }
}
