//! Client configuration model.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://frontend-take-home-service.fetch.com";

/// Settings read from `config.toml`; every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL of the remote catalog service
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Freshness window of cached pages, details and breeds
    pub stale_time_secs: u64,
    /// Period of background session revalidation
    pub revalidate_interval_secs: u64,
    /// Location of the persisted client state; resolved by the
    /// infrastructure layer when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            stale_time_secs: 5 * 60,
            revalidate_interval_secs: 5 * 60,
            state_file: None,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn revalidate_interval(&self) -> Duration {
        Duration::from_secs(self.revalidate_interval_secs)
    }
}
