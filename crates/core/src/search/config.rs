//! Search orchestrator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the search orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiescence window before a typed query is considered settled (milliseconds).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    800
}

impl SearchConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}
