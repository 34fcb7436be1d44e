//! Configuration service implementation.
//!
//! Loads the client configuration from `config.toml` and layers environment
//! overrides on top.
//!
//! Priority: environment variables > config.toml > built-in defaults.

use std::path::PathBuf;

use pawmatch_core::config::ClientConfig;
use pawmatch_core::{PawError, Result};

use crate::paths::PawPaths;
use crate::storage::TomlDocument;

pub const ENV_BASE_URL: &str = "PAWMATCH_BASE_URL";
pub const ENV_STATE_FILE: &str = "PAWMATCH_STATE_FILE";

/// Loads [`ClientConfig`] for a given path layout.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: PawPaths,
}

impl ConfigService {
    pub fn new(paths: PawPaths) -> Self {
        Self { paths }
    }

    /// Reads `config.toml` (defaults when missing) and applies process
    /// environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Like [`ConfigService::load`] with an explicit environment lookup.
    pub fn load_with_env<F>(&self, env: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = self.paths.config_file();
        let file = TomlDocument::<ClientConfig>::new(path.clone());

        let mut config = match file.read() {
            Ok(Some(config)) => {
                tracing::debug!("[ConfigService] Loaded {}", path.display());
                config
            }
            Ok(None) => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    path.display()
                );
                ClientConfig::default()
            }
            Err(e) => {
                return Err(PawError::Config(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if let Some(base_url) = env(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url;
        }
        if let Some(state_file) = env(ENV_STATE_FILE).filter(|v| !v.trim().is_empty()) {
            config.state_file = Some(PathBuf::from(state_file));
        }

        if config.base_url.trim().is_empty() {
            return Err(PawError::Config("base_url must not be empty".to_string()));
        }

        Ok(config)
    }

    /// Where the persisted client state lives for `config`.
    pub fn state_file(&self, config: &ClientConfig) -> PathBuf {
        config
            .state_file
            .clone()
            .unwrap_or_else(|| self.paths.state_file())
    }

    /// Writes `config` back to `config.toml`.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        TomlDocument::<ClientConfig>::new(self.paths.config_file())
            .write(config)
            .map_err(PawError::from)
    }
}
