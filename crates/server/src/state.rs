use cinescout_core::{Config, SanitizedConfig, SearchHandle};

/// Shared application state
pub struct AppState {
    config: Config,
    search: SearchHandle,
}

impl AppState {
    pub fn new(config: Config, search: SearchHandle) -> Self {
        Self { config, search }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Handle to the running search orchestrator.
    pub fn search(&self) -> &SearchHandle {
        &self.search
    }

    /// Base URL poster paths are resolved against.
    pub fn image_base_url(&self) -> &str {
        self.config.catalog.image_base_url()
    }
}
