//! Client configuration, built once at startup and shared by reference.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{default_user_agent, APP_NAME, CONFIG_FILE};
use crate::models::{AuthConfig, Header};

/// Settings that apply to every compiled request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for request URLs that carry no scheme
    pub base_url: Option<String>,
    /// Whole-request timeout; none unless configured
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
    /// Sent with every request, before the request's own headers
    pub default_headers: Vec<Header>,
    /// Used when a request's own auth is `none`
    pub default_auth: AuthConfig,
    /// Ignore TLS certificate errors (testing environments only)
    pub accept_invalid_certs: bool,
    /// Where imported collections are stored
    pub collections_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: None,
            timeout_secs: None,
            user_agent: default_user_agent(),
            default_headers: Vec::new(),
            default_auth: AuthConfig::None,
            accept_invalid_certs: false,
            collections_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load from the per-user config file, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: ClientConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::info!(path = %path.display(), "Loaded client config");
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Resolved collections directory
    pub fn collections_dir(&self) -> PathBuf {
        self.collections_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_NAME)
                .join("collections")
        })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}
