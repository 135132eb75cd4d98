//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Settings for the client set.
///
/// Loaded from an optional `riptide.toml` (or `.yaml`/`.json`) in the working
/// directory, overridden by `RIPTIDE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the auth service.
    pub auth_base_url: String,
    /// Base URL of the catalog service.
    pub catalog_base_url: String,
    /// Base URL for everything else.
    pub api_base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Whether expired access tokens are renewed transparently.
    pub auto_refresh: bool,
    /// Verbose request/response logging for development.
    pub dev_logging: bool,
    /// Session file location; defaults to the platform config directory.
    pub session_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auth_base_url: DEFAULT_BASE_URL.to_owned(),
            catalog_base_url: DEFAULT_BASE_URL.to_owned(),
            api_base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            auto_refresh: true,
            dev_logging: false,
            session_file: None,
        }
    }
}

impl Settings {
    /// Loads settings from `riptide.*` config files and `RIPTIDE_*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a source exists but cannot be parsed.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("riptide").required(false))
            .add_source(config::Environment::with_prefix("RIPTIDE"))
            .build()?
            .try_deserialize()
    }

    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
