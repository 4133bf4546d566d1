use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::catalog::TmdbConfig;
use crate::search::SearchConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: TmdbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Analytics store configuration (trending aggregation).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// SQLite database holding per-query hit counts.
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,
    /// Number of entries in the trending ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            top_n: default_top_n(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("cinescout.db")
}

fn default_top_n() -> usize {
    5
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub catalog: SanitizedCatalogConfig,
    pub analytics: AnalyticsConfig,
    pub search: SearchConfig,
}

/// Sanitized catalog config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub base_url: String,
    pub image_base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            catalog: SanitizedCatalogConfig {
                base_url: config.catalog.base_url().to_string(),
                image_base_url: config.catalog.image_base_url().to_string(),
                api_key_configured: !config.catalog.api_key.is_empty(),
                timeout_secs: config.catalog.timeout_secs,
            },
            analytics: config.analytics.clone(),
            search: config.search.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[catalog]
api_key = "abc"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.catalog.api_key, "abc");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.analytics.top_n, 5);
        assert_eq!(
            config.analytics.database_path.to_str().unwrap(),
            "cinescout.db"
        );
        assert_eq!(config.search.debounce_ms, 800);
        assert_eq!(config.catalog.timeout_secs, 30);
    }

    #[test]
    fn test_deserialize_missing_catalog_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[catalog]
api_key = "secret"
base_url = "http://localhost:9999/3"
image_base_url = "http://localhost:9999/img"
timeout_secs = 5

[analytics]
database_path = "/data/trending.sqlite"
top_n = 10

[search]
debounce_ms = 300
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.catalog.base_url(), "http://localhost:9999/3");
        assert_eq!(config.catalog.image_base_url(), "http://localhost:9999/img");
        assert_eq!(config.catalog.timeout_secs, 5);
        assert_eq!(config.analytics.top_n, 10);
        assert_eq!(config.search.debounce_ms, 300);
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let config: Config = toml::from_str(
            r#"
[catalog]
api_key = "very-secret"
"#,
        )
        .unwrap();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.catalog.api_key_configured);
        assert_eq!(sanitized.catalog.base_url, "https://api.themoviedb.org/3");

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("very-secret"));
    }
}
