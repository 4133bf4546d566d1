//! Search orchestration.
//!
//! The orchestrator owns all search state and is driven by two kinds of
//! events: raw query text changes (debounced into settled queries) and
//! completion of catalog/aggregator calls. It publishes [`SearchState`] and
//! [`TrendingRanking`](crate::trending::TrendingRanking) snapshots through
//! watch channels for the presentation layer to subscribe to.
//!
//! Each settled query gets a new generation number. A completion whose
//! generation is not the latest is discarded, so a slow response for an
//! older query can never overwrite the result of a newer one.

mod config;
mod runner;
mod session;
mod types;

pub use config::SearchConfig;
pub use runner::{SearchHandle, SearchOrchestrator};
pub use session::{Completion, FetchTicket, SearchSession};
pub use types::{SearchError, SearchPhase, SearchState};
