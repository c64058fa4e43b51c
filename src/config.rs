use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dirs;
use crate::error::{Result, WorkbenchError};
use crate::forwarder::DEFAULT_PROXY_PATH_SUFFIX;
use crate::inference::{DEFAULT_LOCAL_MODEL, DEFAULT_PROXIED_MODEL};

/// User-configurable settings for the workbench server and CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbenchConfig {
    /// Host address for the HTTP server (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP server (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding chatbot.json, codeGen.json and integrations.json
    #[serde(default = "dirs::data_dir")]
    pub data_dir: PathBuf,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Model requested from local integrations
    #[serde(default = "default_local_model")]
    pub local_model: String,

    /// Model requested from proxied integrations
    #[serde(default = "default_proxied_model")]
    pub proxied_model: String,

    /// Path appended to a proxied integration's endpoint
    #[serde(default = "default_proxy_path_suffix")]
    pub proxy_path_suffix: String,

    /// Upstream request timeout in seconds; 0 disables it
    #[serde(default)]
    pub inference_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_local_model() -> String {
    DEFAULT_LOCAL_MODEL.to_string()
}

fn default_proxied_model() -> String {
    DEFAULT_PROXIED_MODEL.to_string()
}

fn default_proxy_path_suffix() -> String {
    DEFAULT_PROXY_PATH_SUFFIX.to_string()
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: dirs::data_dir(),
            cors_origins: Vec::new(),
            local_model: default_local_model(),
            proxied_model: default_proxied_model(),
            proxy_path_suffix: default_proxy_path_suffix(),
            inference_timeout_secs: 0,
        }
    }
}

impl WorkbenchConfig {
    /// Load configuration from the default config file path.
    /// Returns default config if the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(dirs::config_path())
    }

    /// Load configuration from an explicit path, defaulting when absent.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            WorkbenchError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: WorkbenchConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to an explicit path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(WorkbenchError::Config("host must not be empty".to_string()));
        }
        if !self.proxy_path_suffix.starts_with('/') {
            return Err(WorkbenchError::Config(format!(
                "proxy_path_suffix must start with '/': {}",
                self.proxy_path_suffix
            )));
        }
        if self.local_model.trim().is_empty() || self.proxied_model.trim().is_empty() {
            return Err(WorkbenchError::Config(
                "model names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the server bind address string (e.g., "127.0.0.1:3000").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
