//! Types for search orchestration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::MovieSummary;

/// Errors returned by the search handle.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The orchestrator task is no longer running.
    #[error("search orchestrator stopped")]
    OrchestratorStopped,
}

/// Lifecycle phase of the current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// A fetch for the settled query is in flight.
    Loading,
    /// The last fetch returned results (possibly none).
    Success,
    /// The last fetch failed; `error` holds the user-facing message.
    Failed,
}

/// Snapshot of search state published to the presentation layer.
///
/// Fields are only changed through the transition methods, which keep the
/// invariants: `is_loading` and `error` are never both set, and `results`
/// is empty whenever `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchState {
    /// Raw text as currently typed.
    query: String,
    /// Query the visible results belong to (or are loading for).
    settled_query: Option<String>,
    phase: SearchPhase,
    is_loading: bool,
    error: Option<String>,
    results: Vec<MovieSummary>,
}

impl SearchState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn settled_query(&self) -> Option<&str> {
        self.settled_query.as_deref()
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn results(&self) -> &[MovieSummary] {
        &self.results
    }

    pub(crate) fn set_query(&mut self, raw: String) {
        self.query = raw;
    }

    /// Enter `Loading`: error cleared, previous results kept until replaced.
    pub(crate) fn begin_loading(&mut self, settled: &str) {
        self.settled_query = Some(settled.to_string());
        self.phase = SearchPhase::Loading;
        self.is_loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, results: Vec<MovieSummary>) {
        self.phase = SearchPhase::Success;
        self.is_loading = false;
        self.error = None;
        self.results = results;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.phase = SearchPhase::Failed;
        self.is_loading = false;
        self.error = Some(message);
        self.results.clear();
    }
}
