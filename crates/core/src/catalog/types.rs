//! Types for catalog requests and results.

use serde::{Deserialize, Serialize};

/// Poster shown when a movie has no poster of its own.
pub const NO_POSTER_PLACEHOLDER: &str = "/no-movie.png";

/// Label used when a rating or year is unknown.
const UNKNOWN_LABEL: &str = "N/A";

/// A single entry of a catalog result page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    /// Catalog identifier, unique per entry.
    pub id: u64,
    /// Movie title.
    pub title: String,
    /// Poster path (relative to the image base URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Average vote (0-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f32>,
    /// ISO 639-1 language code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    /// Release date (YYYY-MM-DD or partial).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl MovieSummary {
    /// Create a summary with only the required fields set.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            poster_path: None,
            vote_average: None,
            original_language: None,
            release_date: None,
        }
    }

    /// Get the release year from the release date.
    pub fn release_year(&self) -> Option<u32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok())
    }

    /// Full poster URL, or the placeholder when there is no poster.
    pub fn poster_url(&self, image_base_url: &str) -> String {
        match self.poster_path.as_deref() {
            Some(path) if !path.is_empty() => format!(
                "{}/{}",
                image_base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            _ => NO_POSTER_PLACEHOLDER.to_string(),
        }
    }

    /// Rating with one decimal, `N/A` when missing or zero.
    ///
    /// Exact halfway values (`7.25`, `8.75`) round up rather than to even.
    pub fn rating_label(&self) -> String {
        match self.vote_average {
            Some(v) if v > 0.0 => format!("{:.1}", round_half_up_tenths(f64::from(v))),
            _ => UNKNOWN_LABEL.to_string(),
        }
    }

    /// Release year as text, `N/A` when unknown.
    pub fn year_label(&self) -> String {
        self.release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    }

    /// Language code, `N/A` when unknown.
    pub fn language_label(&self) -> &str {
        self.original_language.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// Only multiples of 0.25 can sit exactly between two tenths in binary,
/// and for those `v * 10.0` is exact.
fn round_half_up_tenths(v: f64) -> f64 {
    let quarters = v * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        (v * 10.0).round() / 10.0
    } else {
        v
    }
}

/// Which listing a query maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogMode {
    /// Text search scoped to the query.
    Search,
    /// Default listing sorted by popularity.
    Discover,
}

impl CatalogMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogMode::Search => "search",
            CatalogMode::Discover => "discover",
        }
    }
}

/// A catalog request derived from a settled query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRequest {
    Search { query: String },
    Discover,
}

impl CatalogRequest {
    /// Empty query means discover mode, anything else is a search.
    pub fn for_query(query: &str) -> Self {
        if query.is_empty() {
            CatalogRequest::Discover
        } else {
            CatalogRequest::Search {
                query: query.to_string(),
            }
        }
    }

    pub fn mode(&self) -> CatalogMode {
        match self {
            CatalogRequest::Search { .. } => CatalogMode::Search,
            CatalogRequest::Discover => CatalogMode::Discover,
        }
    }

    /// Endpoint path and query string, relative to the API base URL.
    pub fn path_and_query(&self) -> String {
        match self {
            CatalogRequest::Search { query } => format!(
                "search/movie?query={}&include_adult=false",
                urlencoding::encode(query)
            ),
            CatalogRequest::Discover => "discover/movie?sort_by=popularity.desc".to_string(),
        }
    }
}
