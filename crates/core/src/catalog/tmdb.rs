//! TMDB (The Movie Database) catalog client.
//!
//! Uses v4-style bearer token authentication. Search requests always
//! exclude adult content.

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::{CatalogRequest, MovieSummary};
use super::{CatalogError, MovieCatalog, UPSTREAM_FALLBACK_MESSAGE};
use crate::metrics::{CATALOG_REQUESTS, CATALOG_REQUEST_DURATION};

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// TMDB client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// API read access token, sent as a bearer token.
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Image base URL for posters (default: https://image.tmdb.org/t/p/w500).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl TmdbConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn image_base_url(&self) -> &str {
        self.image_base_url
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }
}

/// TMDB catalog client.
pub struct TmdbCatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbCatalogClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self, CatalogError> {
        if config.api_key.is_empty() {
            return Err(CatalogError::NotConfigured(
                "TMDB API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Full URL for a request.
    pub fn endpoint(&self, request: &CatalogRequest) -> String {
        format!("{}/{}", self.base_url, request.path_and_query())
    }

    async fn execute(&self, request: &CatalogRequest) -> Result<Vec<MovieSummary>, CatalogError> {
        let url = self.endpoint(request);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Transport {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_catalog_body(&body)
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbCatalogClient {
    async fn fetch_catalog(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        let request = CatalogRequest::for_query(query);
        let mode = request.mode().as_str();

        debug!("Catalog {} request: query='{}'", mode, query);

        let started = Instant::now();
        let result = self.execute(&request).await;

        CATALOG_REQUEST_DURATION
            .with_label_values(&[mode])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(movies) => {
                CATALOG_REQUESTS.with_label_values(&[mode, "success"]).inc();
                debug!("Catalog {} returned {} results", mode, movies.len());
            }
            Err(e) => {
                CATALOG_REQUESTS.with_label_values(&[mode, e.kind()]).inc();
                warn!("Catalog {} request failed: {}", mode, e);
            }
        }

        result
    }
}

/// Parse a catalog response body.
///
/// Recognises both failure encodings: `{"Response": "False", "Error": ..}`
/// and `{"success": false, "status_message": ..}`. A missing `results`
/// array is treated as an empty page.
pub fn parse_catalog_body(body: &str) -> Result<Vec<MovieSummary>, CatalogError> {
    let response: CatalogResponse = serde_json::from_str(body).map_err(|e| {
        CatalogError::Unexpected(format!("Failed to parse catalog response: {}", e))
    })?;

    if response.is_failure() {
        let message = response
            .error
            .or(response.status_message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| UPSTREAM_FALLBACK_MESSAGE.to_string());
        return Err(CatalogError::Upstream(message));
    }

    Ok(response
        .results
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<MovieResult>(item) {
            Ok(movie) => Some(movie.into()),
            Err(e) => {
                warn!("Skipping malformed catalog result at index {}: {}", index, e);
                None
            }
        })
        .collect())
}

// ============================================================================
// TMDB API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    results: Option<Vec<serde_json::Value>>,
    #[serde(default, rename = "Response")]
    response: Option<String>,
    #[serde(default, rename = "Error")]
    error: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    status_message: Option<String>,
}

impl CatalogResponse {
    fn is_failure(&self) -> bool {
        self.response.as_deref() == Some("False") || self.success == Some(false)
    }
}

#[derive(Debug, Deserialize)]
struct MovieResult {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    poster_path: Option<String>,
    vote_average: Option<f32>,
    original_language: Option<String>,
    release_date: Option<String>,
}

impl From<MovieResult> for MovieSummary {
    fn from(r: MovieResult) -> Self {
        Self {
            id: r.id,
            title: r.title.unwrap_or_default(),
            poster_path: r.poster_path.filter(|p| !p.is_empty()),
            vote_average: r.vote_average,
            original_language: r.original_language.filter(|l| !l.is_empty()),
            release_date: r.release_date.filter(|d| !d.is_empty()),
        }
    }
}
