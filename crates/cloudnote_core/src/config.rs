//! Remote store connection configuration.
//!
//! # Responsibility
//! - Hold the base URL, API key and collection path used by the store client.
//! - Load those values from the process environment or a `.env` file.
//!
//! # Invariants
//! - A constructed `RemoteConfig` always has a non-blank key and an
//!   `http(s)://` base URL without trailing slash.
//! - The API key never appears in `Debug` output or log events.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;

/// Environment key holding the backend base URL.
pub const ENV_BASE_URL: &str = "SUPABASE_URL";
/// Environment key holding the static API key.
pub const ENV_API_KEY: &str = "SUPABASE_KEY";
/// Optional environment key overriding the collection path.
pub const ENV_COLLECTION_PATH: &str = "NOTES_COLLECTION_PATH";
/// Collection path appended to the base URL when none is configured.
pub const DEFAULT_COLLECTION_PATH: &str = "rest/v1/notes";

/// Configuration loading/validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required key is absent or blank.
    Missing(&'static str),
    /// Key is present but its value is unusable.
    Invalid { key: &'static str, message: String },
    /// `.env` file could not be read or parsed.
    EnvFile(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required config `{key}`"),
            Self::Invalid { key, message } => write!(f, "invalid config `{key}`: {message}"),
            Self::EnvFile(message) => write!(f, "failed to load env file: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Immutable connection settings for the remote note collection.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    base_url: String,
    api_key: String,
    collection_path: String,
}

impl RemoteConfig {
    /// Builds a config from explicit values.
    ///
    /// # Errors
    /// - `Missing` when either value is blank.
    /// - `Invalid` when `base_url` has no `http://` or `https://` scheme.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ConfigError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ConfigError::Missing(ENV_BASE_URL));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: ENV_BASE_URL,
                message: format!("expected http(s) URL, got `{base_url}`"),
            });
        }
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::Missing(ENV_API_KEY));
        }

        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            collection_path: DEFAULT_COLLECTION_PATH.to_string(),
        })
    }

    /// Overrides the collection path. Blank input keeps the current path.
    pub fn with_collection_path(mut self, path: &str) -> Self {
        let trimmed = path.trim().trim_matches('/');
        if !trimmed.is_empty() {
            self.collection_path = trimmed.to_string();
        }
        self
    }

    /// Reads `SUPABASE_URL`, `SUPABASE_KEY` and optional
    /// `NOTES_COLLECTION_PATH` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the same keys from a `.env` file without mutating the process
    /// environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path)
            .map_err(|err| ConfigError::EnvFile(format!("{}: {err}", path.display())))?;

        let mut values = Vec::new();
        for entry in entries {
            let (key, value) =
                entry.map_err(|err| ConfigError::EnvFile(format!("{}: {err}", path.display())))?;
            values.push((key, value));
        }

        let config = Self::from_lookup(|key| {
            values
                .iter()
                .rev()
                .find(|(candidate, _)| candidate == key)
                .map(|(_, value)| value.clone())
        });
        match &config {
            Ok(config) => info!(
                "event=config_load module=config status=ok source=env_file base_url={}",
                config.base_url
            ),
            Err(err) => warn!(
                "event=config_load module=config status=error source=env_file error={}",
                err
            ),
        }
        config
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(ENV_BASE_URL).ok_or(ConfigError::Missing(ENV_BASE_URL))?;
        let api_key = lookup(ENV_API_KEY).ok_or(ConfigError::Missing(ENV_API_KEY))?;
        let config = Self::new(&base_url, &api_key)?;
        Ok(match lookup(ENV_COLLECTION_PATH) {
            Some(path) => config.with_collection_path(&path),
            None => config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn collection_path(&self) -> &str {
        &self.collection_path
    }

    /// Full URL of the notes collection resource.
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.collection_path)
    }
}

impl Debug for RemoteConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("collection_path", &self.collection_path)
            .finish()
    }
}
