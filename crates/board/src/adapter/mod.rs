//! Store adapters and their configuration.
//!
//! [`StoreConfig`] carries what the board needs to reach a remote record
//! store: the API base URL, an optional bearer token issued by the session
//! layer, and a request timeout. Values come from code, from the
//! environment, or from a config file parsed by the caller.

#[cfg(feature = "adapter")]
pub mod http;

use std::time::Duration;

/// Default API base URL for a locally running store.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/api";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "SIGBOARD_API_URL";
pub const ENV_AUTH_TOKEN: &str = "SIGBOARD_AUTH_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "SIGBOARD_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a positive number of seconds, got '{value}'")]
    InvalidTimeout { key: String, value: String },

    #[error("{key} must be an http(s) URL, got '{value}'")]
    InvalidUrl { key: String, value: String },
}

/// Connection settings for a remote record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl StoreConfig {
    /// Defaults overlaid with `SIGBOARD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        StoreConfig::default().overlay_env(|key| std::env::var(key).ok())
    }

    /// Overlay values found through `lookup` (normally the process
    /// environment). Empty values are ignored.
    pub fn overlay_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.base_url = validate_url(ENV_API_URL, &url)?;
        }
        if let Some(token) = get(ENV_AUTH_TOKEN) {
            self.auth_token = Some(token);
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            self.timeout = parse_timeout(ENV_TIMEOUT_SECS, &secs)?;
        }
        Ok(self)
    }
}

/// Check that `value` parses as an http(s) URL with a host and drop
/// trailing slashes.
pub fn validate_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).ok();
    match parsed {
        Some(url) if is_http(&url) => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidUrl {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn is_http(url: &url::Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host().is_some()
}

/// Parse a positive whole number of seconds.
pub fn parse_timeout(key: &str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = StoreConfig::default().overlay_env(env(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.base_url, "http://localhost:8081/api");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = StoreConfig::default()
            .overlay_env(env(&[
                (ENV_API_URL, "https://board.example.org/api/"),
                (ENV_AUTH_TOKEN, "t0k3n"),
                (ENV_TIMEOUT_SECS, "5"),
            ]))
            .unwrap();
        assert_eq!(config.base_url, "https://board.example.org/api");
        assert_eq!(config.auth_token.as_deref(), Some("t0k3n"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn empty_environment_values_are_ignored() {
        let config = StoreConfig::default()
            .overlay_env(env(&[(ENV_AUTH_TOKEN, "")]))
            .unwrap();
        assert_eq!(config.auth_token, None);
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = StoreConfig::default()
            .overlay_env(env(&[(ENV_TIMEOUT_SECS, "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }));

        let err = StoreConfig::default()
            .overlay_env(env(&[(ENV_API_URL, "localhost:8081")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "SIGBOARD_API_URL must be an http(s) URL, got 'localhost:8081'"
        );
    }

    #[test]
    fn url_validation_checks_scheme_and_host() {
        assert_eq!(
            validate_url("k", " http://10.0.0.5:8081/api// ").unwrap(),
            "http://10.0.0.5:8081/api"
        );
        assert!(validate_url("k", "ftp://example.org/api").is_err());
        assert!(validate_url("k", "http://").is_err());
        assert!(validate_url("k", "https://exa mple.org").is_err());
    }
}
