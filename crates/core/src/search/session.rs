//! Pure search state machine.
//!
//! [`SearchSession`] holds no tasks or channels. The runner feeds it events
//! and acts on what it returns, which keeps the ordering rules testable
//! without a runtime.

use crate::catalog::{CatalogError, MovieSummary};

use super::SearchState;

/// Identifies one catalog fetch started for a settled query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: String,
}

/// What the runner should do after a fetch completed.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// A newer fetch was started; the outcome was discarded.
    Stale,
    /// The fetch failed and the error was published.
    Failed,
    /// Results were published. `record_hit` carries the top result when the
    /// hit should be recorded for trending.
    Succeeded { record_hit: Option<MovieSummary> },
}

/// Search state plus the generation counter guarding against stale responses.
#[derive(Debug, Default)]
pub struct SearchSession {
    state: SearchState,
    generation: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Generation of the most recently started fetch.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Raw query text changed. Only the typed text is updated.
    pub fn input_changed(&mut self, raw: impl Into<String>) {
        self.state.set_query(raw.into());
    }

    /// A query settled. Returns the fetch to start, or `None` when the value
    /// matches the query already shown or loading.
    pub fn begin(&mut self, settled: &str) -> Option<FetchTicket> {
        if self.state.settled_query() == Some(settled) {
            return None;
        }
        Some(self.start(settled.to_string()))
    }

    /// Re-issue the current settled query as a new generation.
    ///
    /// Before anything settled this starts the default listing.
    pub fn restart(&mut self) -> FetchTicket {
        let query = self.state.settled_query().unwrap_or_default().to_string();
        self.start(query)
    }

    /// Apply a fetch outcome if `ticket` is still the latest fetch.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<Vec<MovieSummary>, CatalogError>,
    ) -> Completion {
        if ticket.generation != self.generation {
            return Completion::Stale;
        }

        match outcome {
            Ok(results) => {
                let record_hit = if ticket.query.is_empty() {
                    None
                } else {
                    results.first().cloned()
                };
                self.state.succeed(results);
                Completion::Succeeded { record_hit }
            }
            Err(e) => {
                self.state.fail(e.user_message());
                Completion::Failed
            }
        }
    }

    fn start(&mut self, query: String) -> FetchTicket {
        self.generation += 1;
        self.state.begin_loading(&query);
        FetchTicket {
            generation: self.generation,
            query,
        }
    }
}
