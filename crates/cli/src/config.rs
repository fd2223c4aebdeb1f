//! Connection settings for the `sigboard` binary.
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config PATH`, or `sigboard.toml` in the working
//!    directory when it exists)
//! 3. `SIGBOARD_*` environment variables
//! 4. command-line flags
//!
//! # Example
//!
//! ```toml
//! api_url = "https://board.example.org/api"
//! token = "eyJhbGciOi..."
//! timeout_secs = 10
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sigboard_board::adapter::{parse_timeout, validate_url, ConfigError, StoreConfig};

/// File looked up in the working directory when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "sigboard.toml";

// ── Types ─────────────────────────────────────────────────────────────────────

/// Contents of a config file. Every key is optional; unknown keys are errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Overrides<'a> {
    pub api_url: Option<&'a str>,
    pub token: Option<&'a str>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum SettingsError {
    #[error("could not read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

// ── Functions ─────────────────────────────────────────────────────────────────

pub(crate) fn read_config_file(path: &Path) -> Result<FileConfig, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the explicit config file, or the default one if present.
///
/// A missing explicit file is an error; a missing default file is not.
pub(crate) fn load_config_file(
    explicit: Option<&Path>,
) -> Result<Option<FileConfig>, SettingsError> {
    match explicit {
        Some(path) => read_config_file(path).map(Some),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                tracing::debug!(path = %path.display(), "using default config file");
                read_config_file(path).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}

/// Layer defaults, file, environment (through `lookup`) and flags.
pub(crate) fn resolve<F>(
    file: Option<FileConfig>,
    lookup: F,
    overrides: Overrides<'_>,
) -> Result<StoreConfig, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = StoreConfig::default();

    if let Some(file) = file {
        if let Some(url) = file.api_url.as_deref() {
            config.base_url = validate_url("api_url", url)?;
        }
        if let Some(token) = file.token.filter(|t| !t.trim().is_empty()) {
            config.auth_token = Some(token);
        }
        if let Some(secs) = file.timeout_secs {
            config.timeout = parse_timeout("timeout_secs", &secs.to_string())?;
        }
    }

    let mut config = config.overlay_env(lookup)?;

    if let Some(url) = overrides.api_url {
        config.base_url = validate_url("--api-url", url)?;
    }
    if let Some(token) = overrides.token.filter(|t| !t.trim().is_empty()) {
        config.auth_token = Some(token.to_string());
    }
    Ok(config)
}
