//! Layered configuration for qcdesk.
//!
//! Settings come from `qcdesk.toml` in the config directory (or `--config`),
//! then the environment, then command-line flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:3001/api"
//! timeout_secs = 30
//!
//! [defaults]
//! plant = "HT"
//! line = "LINE-1"
//! shift = "S1"
//! auto_deduct = true
//! history_take = 20
//! ```
//!
//! | Setting        | Environment            | Flag        |
//! |----------------|------------------------|-------------|
//! | `api.base_url` | `QCDESK_API_URL`       | `--api-url` |
//! | `api.timeout_secs` | `QCDESK_TIMEOUT_SECS` |          |

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::model::Shift;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";
pub const ENV_API_URL: &str = "QCDESK_API_URL";
pub const ENV_TIMEOUT: &str = "QCDESK_TIMEOUT_SECS";

/// `<platform config dir>/qcdesk`, or `./.qcdesk` when the platform has none.
pub fn config_home() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("qcdesk"))
        .unwrap_or_else(|| PathBuf::from(".qcdesk"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Defaults for the entry commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(default)]
    pub shift: Shift,
    /// Deduct post-cure output from the IPQC source when setting "after".
    #[serde(default = "default_auto_deduct")]
    pub auto_deduct: bool,
    #[serde(default = "default_history_take")]
    pub history_take: u32,
}

fn default_auto_deduct() -> bool {
    true
}

fn default_history_take() -> u32 {
    20
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            plant: None,
            line: None,
            shift: Shift::default(),
            auto_deduct: default_auto_deduct(),
            history_take: default_history_take(),
        }
    }
}

/// Contents of `qcdesk.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QcToml {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

impl QcToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse qcdesk.toml")
    }

    /// Defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize qcdesk.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !is_http_url(&self.api.base_url) {
            warnings.push(format!(
                "Invalid api.base_url '{}': should start with http:// or https://",
                self.api.base_url
            ));
        }
        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0: every request would time out".to_string());
        }
        if self.defaults.history_take == 0 {
            warnings.push("defaults.history_take is 0: history pages would be empty".to_string());
        }
        warnings
    }
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("http://") || url.starts_with("https://")
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Resolved configuration: file, then environment, then flags.
#[derive(Debug, Clone)]
pub struct QcConfig {
    pub path: PathBuf,
    pub toml: QcToml,
    /// `--api-url`
    pub cli_api_url: Option<String>,
}

impl QcConfig {
    pub fn default_path() -> PathBuf {
        config_home().join("qcdesk.toml")
    }

    pub fn load(path: Option<PathBuf>, cli_api_url: Option<String>) -> Result<Self> {
        let path = path.unwrap_or_else(Self::default_path);
        let toml = QcToml::load_or_default(&path)?;
        Ok(Self {
            path,
            toml,
            cli_api_url: cli_api_url.filter(|u| !u.trim().is_empty()),
        })
    }

    /// Base URL (flag → env → file).
    pub fn base_url(&self) -> String {
        self.cli_api_url
            .clone()
            .or_else(|| env_value(ENV_API_URL))
            .unwrap_or_else(|| self.toml.api.base_url.clone())
    }

    /// Request timeout (env → file). Unparseable env values are ignored.
    pub fn timeout(&self) -> Duration {
        let secs = env_value(ENV_TIMEOUT)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(self.toml.api.timeout_secs);
        Duration::from_secs(secs)
    }

    pub fn client(&self, token: Option<String>) -> Result<ApiClient> {
        let base_url = self.base_url();
        let client = ApiClient::new(&base_url, self.timeout())
            .with_context(|| format!("Failed to build HTTP client for {}", base_url))?;
        Ok(client.with_token(token))
    }

    /// File warnings plus a check of the effective URL.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.toml.validate();
        let effective = self.base_url();
        if effective != self.toml.api.base_url && !is_http_url(&effective) {
            warnings.push(format!(
                "Effective API URL '{}' should start with http:// or https://",
                effective
            ));
        }
        warnings
    }
}
