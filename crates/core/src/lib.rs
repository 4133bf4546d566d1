pub mod catalog;
pub mod config;
pub mod debounce;
pub mod metrics;
pub mod search;
pub mod testing;
pub mod trending;

pub use catalog::{
    CatalogError, CatalogMode, CatalogRequest, MovieCatalog, MovieSummary, TmdbCatalogClient,
    TmdbConfig,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AnalyticsConfig, Config, ConfigError,
    SanitizedConfig, ServerConfig,
};
pub use debounce::QueryDebouncer;
pub use search::{
    SearchConfig, SearchError, SearchHandle, SearchOrchestrator, SearchPhase, SearchState,
};
pub use trending::{
    AnalyticsStore, SqliteAnalyticsStore, TrendingAggregator, TrendingEntry, TrendingError,
    TrendingRanking,
};
