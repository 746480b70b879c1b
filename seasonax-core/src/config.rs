//! Dashboard configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Lookback;
use crate::refresh::RetryPolicy;

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "SEASONAX_API_URL";

pub const DEFAULT_BASE_URL: &str = "https://price-pattern-backend.onrender.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub refresh: RefreshConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Consecutive failures before the circuit breaker opens.
    pub breaker_threshold: u32,
    pub breaker_cooldown_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            breaker_threshold: 5,
            breaker_cooldown_secs: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl RefreshConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub asset: String,
    pub lookback: Lookback,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            asset: "AAPL".to_string(),
            lookback: Lookback::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// `<config_dir>/seasonax/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("seasonax").join("config.toml"))
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Otherwise the default path is read if
    /// present, else built-in defaults apply. `SEASONAX_API_URL` wins over
    /// either.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.apply_api_url_override(&url)?;
        }
        Ok(config)
    }

    pub fn apply_api_url_override(&mut self, url: &str) -> Result<(), ConfigError> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(());
        }
        tracing::info!(%url, "backend URL overridden from environment");
        self.api.base_url = url.to_string();
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must be an http(s) URL, got '{url}'"
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be positive".into()));
        }
        if self.defaults.asset.trim().is_empty() {
            return Err(ConfigError::Invalid("defaults.asset must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.refresh.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let text = r#"
            [api]
            base_url = "http://localhost:8000"

            [refresh]
            max_retries = 4

            [defaults]
            lookback = "max"
        "#;
        let config = DashboardConfig::from_toml_str(text).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.refresh.max_retries, 4);
        assert_eq!(config.refresh.retry_delay_ms, 1000);
        assert_eq!(config.defaults.lookback, Lookback::Max);
        assert_eq!(config.defaults.asset, "AAPL");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            DashboardConfig::from_toml_str("[api]\nbase_url = \"ftp://x\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml_str("[defaults]\nlookback = \"0\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml_str("[api\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[refresh]\nretry_delay_ms = 250").unwrap();
        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(
            config.refresh.retry_policy().delay,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            DashboardConfig::resolve(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn url_override() {
        let mut config = DashboardConfig::default();
        config.apply_api_url_override("  ").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        config.apply_api_url_override("http://127.0.0.1:5000").unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
        assert!(config.apply_api_url_override("nonsense").is_err());
    }
}
