use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_MAPPING_PATH: &str = "harbor_mapping.yaml";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro-latest";

/// On-disk shape of the Harbor mapping document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingDocument {
    #[serde(default)]
    pub harbor_base_url: Option<String>,
    #[serde(default)]
    pub mappings: Option<BTreeMap<String, String>>,
}

/// Gemini client configuration
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_GEMINI_API_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Process settings read from the environment at startup
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub mapping_path: PathBuf,
    pub gemini: GeminiConfig,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            mapping_path: PathBuf::from(DEFAULT_MAPPING_PATH),
            gemini: GeminiConfig::default(),
        }
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from an arbitrary variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(host) = get("DOCKERGEN_HOST") {
            settings.host = host;
        }
        if let Some(port) = get("DOCKERGEN_PORT") {
            settings.port = parse_setting("DOCKERGEN_PORT", &port)?;
        }
        if let Some(path) = get("HARBOR_MAPPING_PATH") {
            settings.mapping_path = PathBuf::from(path);
        }

        settings.gemini.api_key = get("GEMINI_API_KEY").or_else(|| get("gemini_API_KEY"));
        if let Some(url) = get("GEMINI_API_URL") {
            settings.gemini.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("GEMINI_MODEL") {
            settings.gemini.model = model;
        }
        if let Some(timeout) = get("AI_TIMEOUT_SECS") {
            settings.gemini.timeout_secs = parse_setting("AI_TIMEOUT_SECS", &timeout)?;
        }

        Ok(settings)
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidSetting {
                name: "DOCKERGEN_HOST".to_string(),
                value: self.host.clone(),
            })
    }
}

fn parse_setting<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidSetting {
        name: name.to_string(),
        value: value.to_string(),
    })
}
