//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the CineScout server:
//! - HTTP request metrics (latency, counts)
//! - WebSocket connection metrics
//! - Search and trending snapshot gauges (collected dynamically)
//!
//! Core metrics (catalog requests, debounce, trending writes) are registered
//! into the same registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cinescout_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinescout_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinescout_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// WebSocket Metrics
// =============================================================================

/// Active WebSocket connections.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinescout_ws_connections_active",
        "Number of active WebSocket connections",
    )
    .unwrap()
});

/// Total WebSocket connections (cumulative).
pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "cinescout_ws_connections_total",
        "Total WebSocket connections since startup",
    )
    .unwrap()
});

/// WebSocket messages sent by type.
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinescout_ws_messages_sent_total", "WebSocket messages sent"),
        &["type"],
    )
    .unwrap()
});

/// WebSocket messages received by type.
pub static WS_MESSAGES_RECEIVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cinescout_ws_messages_received_total",
            "WebSocket messages received from clients",
        ),
        &["type"], // "query_changed", "invalid"
    )
    .unwrap()
});

// =============================================================================
// Snapshot Metrics
// =============================================================================

/// Results in the current search snapshot (collected dynamically).
pub static SEARCH_RESULTS_SHOWN: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinescout_search_results_shown",
        "Number of results in the current search snapshot",
    )
    .unwrap()
});

/// Whether a catalog fetch is in flight (collected dynamically).
pub static SEARCH_LOADING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinescout_search_loading",
        "1 while a catalog fetch is in flight",
    )
    .unwrap()
});

/// Entries in the current trending snapshot (collected dynamically).
pub static TRENDING_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinescout_trending_entries",
        "Number of entries in the current trending snapshot",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // WebSocket
    registry
        .register(Box::new(WS_CONNECTIONS_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_CONNECTIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_MESSAGES_SENT.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_MESSAGES_RECEIVED.clone()))
        .unwrap();

    // Snapshots
    registry
        .register(Box::new(SEARCH_RESULTS_SHOWN.clone()))
        .unwrap();
    registry.register(Box::new(SEARCH_LOADING.clone())).unwrap();
    registry
        .register(Box::new(TRENDING_ENTRIES.clone()))
        .unwrap();

    // Core metrics (catalog, search orchestration, trending)
    for metric in cinescout_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the latest snapshots.
pub fn collect_dynamic_metrics(state: &AppState) {
    let search = state.search().state();
    SEARCH_RESULTS_SHOWN.set(search.results().len() as i64);
    SEARCH_LOADING.set(if search.is_loading() { 1 } else { 0 });

    TRENDING_ENTRIES.set(state.search().trending().len() as i64);
}
