//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog requests (mode, outcome, latency)
//! - Search orchestration (settled queries, stale responses)
//! - Trending aggregation (hit records, ranking reads)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Catalog requests by mode and result.
pub static CATALOG_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinescout_catalog_requests_total", "Total catalog requests"),
        &["mode", "result"], // mode: "search", "discover"; result: "success" or error kind
    )
    .unwrap()
});

/// Catalog request duration in seconds.
pub static CATALOG_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cinescout_catalog_request_duration_seconds",
            "Duration of catalog requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["mode"],
    )
    .unwrap()
});

// =============================================================================
// Search Orchestration Metrics
// =============================================================================

/// Settled queries that started a fetch.
pub static SETTLED_QUERIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "cinescout_settled_queries_total",
        "Settled queries that started a catalog fetch",
    )
    .unwrap()
});

/// Responses dropped because a newer query superseded them.
pub static STALE_RESPONSES_DISCARDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "cinescout_stale_responses_discarded_total",
        "Catalog responses discarded because a newer query was issued",
    )
    .unwrap()
});

// =============================================================================
// Trending Metrics
// =============================================================================

/// Trending hit records by result.
pub static TRENDING_HITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinescout_trending_hits_total", "Trending hit records"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Trending ranking reads by result.
pub static TRENDING_READS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinescout_trending_reads_total", "Trending ranking reads"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Catalog
        Box::new(CATALOG_REQUESTS.clone()),
        Box::new(CATALOG_REQUEST_DURATION.clone()),
        // Search
        Box::new(SETTLED_QUERIES.clone()),
        Box::new(STALE_RESPONSES_DISCARDED.clone()),
        // Trending
        Box::new(TRENDING_HITS.clone()),
        Box::new(TRENDING_READS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_in_fresh_registry() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        CATALOG_REQUESTS
            .with_label_values(&["search", "success"])
            .inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "cinescout_catalog_requests_total"));
    }
}
