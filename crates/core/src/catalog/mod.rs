//! Movie catalog integration.
//!
//! Wraps the remote catalog service behind the [`MovieCatalog`] trait. A
//! non-empty query is a text search, an empty query is the default
//! popularity-sorted discover listing.

mod tmdb;
mod types;

pub use tmdb::{parse_catalog_body, TmdbCatalogClient, TmdbConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Message shown when the upstream failure carries no text of its own.
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "Failed to fetch movies";

/// Message shown to the user for every fault that is not an upstream report.
pub const GENERIC_FETCH_ERROR: &str = "Error fetching movies. Please try again later";

/// Errors that can occur when fetching from the movie catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The transport reported a non-success HTTP status.
    #[error("catalog request failed with status {status}: {message}")]
    Transport { status: u16, message: String },

    /// The response payload signalled an application-level failure.
    #[error("catalog reported failure: {0}")]
    Upstream(String),

    /// Anything else: network failure, timeout, malformed JSON.
    #[error("unexpected catalog fault: {0}")]
    Unexpected(String),

    /// Client not configured (missing API key, etc.).
    #[error("catalog client not configured: {0}")]
    NotConfigured(String),
}

impl CatalogError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Transport { .. } => "transport",
            CatalogError::Upstream(_) => "upstream",
            CatalogError::Unexpected(_) => "unexpected",
            CatalogError::NotConfigured(_) => "not_configured",
        }
    }

    /// The message a user gets to see for this error.
    ///
    /// Only upstream reports are surfaced verbatim.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Upstream(message) => message.clone(),
            _ => GENERIC_FETCH_ERROR.to_string(),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Unexpected(err.to_string())
    }
}

/// Request/response wrapper around the remote catalog service.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Fetch one page of results for the query.
    ///
    /// An empty result set is a valid outcome, distinct from an error.
    async fn fetch_catalog(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError>;
}
