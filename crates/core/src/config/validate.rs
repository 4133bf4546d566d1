use super::{types::Config, ConfigError};

/// Largest accepted trending ranking size.
const MAX_TOP_N: usize = 100;

/// Longest accepted debounce window in milliseconds.
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Catalog API key is present
/// - Trending size is within 1..=100
/// - Debounce window is at most 10 seconds
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.catalog.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.api_key is required".to_string(),
        ));
    }

    if config.analytics.top_n == 0 || config.analytics.top_n > MAX_TOP_N {
        return Err(ConfigError::ValidationError(format!(
            "analytics.top_n must be between 1 and {}",
            MAX_TOP_N
        )));
    }

    if config.search.debounce_ms > MAX_DEBOUNCE_MS {
        return Err(ConfigError::ValidationError(format!(
            "search.debounce_ms cannot exceed {}",
            MAX_DEBOUNCE_MS
        )));
    }

    Ok(())
}
