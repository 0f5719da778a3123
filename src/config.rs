use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub source: SourceConfig,
    /// Number of pages on the "recent updates" listing
    pub recent_limit: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Public base URL, used for links inside feeds
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Redb,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the redb file
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// When false, pages are never fetched and only stored history is served
    pub updates: bool,
    /// Article URL prefix, ending in `/`
    pub wikipedia_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3141".to_string(),
            base_url: "http://localhost:3141".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Redb,
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            updates: true,
            wikipedia_url: "https://en.wikipedia.org/wiki/".to_string(),
            timeout: Duration::from_secs(10),
            user_agent: format!("verssion/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            source: SourceConfig::default(),
            recent_limit: 12,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or(defaults.server.bind_address);

        let base_url = std::env::var("BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.server.base_url);

        let data_dir = std::env::var("DATA_DIR").unwrap_or(defaults.storage.data_dir);

        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "redb".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            _ => StorageBackend::Redb,
        };

        let updates = std::env::var("UPDATES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        let wikipedia_url =
            std::env::var("WIKIPEDIA_URL").unwrap_or(defaults.source.wikipedia_url);

        let timeout = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.source.timeout);

        let user_agent = std::env::var("USER_AGENT").unwrap_or(defaults.source.user_agent);

        let recent_limit = std::env::var("RECENT_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.recent_limit);

        let config = Config {
            server: ServerConfig {
                bind_address,
                base_url,
            },
            storage: StorageConfig { backend, data_dir },
            source: SourceConfig {
                updates,
                wikipedia_url,
                timeout,
                user_agent,
            },
            recent_limit,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "BASE_URL cannot be empty".to_string(),
            ));
        }

        if !self.source.wikipedia_url.ends_with('/') {
            return Err(ConfigError::ValidationError(
                "WIKIPEDIA_URL must end with '/'".to_string(),
            ));
        }

        if self.source.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "FETCH_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        if !self.source.updates {
            tracing::warn!("Updates disabled; serving stored history only.");
        }

        Ok(())
    }

    /// Source article URL of a page.
    pub fn wikipedia_page_url(&self, page: &str) -> String {
        format!("{}{}", self.source.wikipedia_url, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.source.wikipedia_url = "https://en.wikipedia.org/wiki".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.source.timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wikipedia_page_url() {
        assert_eq!(
            Config::default().wikipedia_page_url("Debian"),
            "https://en.wikipedia.org/wiki/Debian"
        );
    }
}
