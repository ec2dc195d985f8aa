pub mod types;

use crate::error::ConfigError;
use crate::resolver::HarborMapping;
use std::path::Path;

pub use types::{GeminiConfig, MappingDocument, ServerSettings};

/// Load the Harbor mapping table from a YAML document.
///
/// A missing, empty or unparseable file is an error. A document without
/// `harbor_base_url` or without `mappings` loads with a warning.
pub fn load_mapping(path: &Path) -> Result<HarborMapping, ConfigError> {
    tracing::info!("Attempting to load configuration from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    parse_mapping(&content, path)
}

/// Parse and validate mapping document text; `origin` is used for messages only.
pub fn parse_mapping(content: &str, origin: &Path) -> Result<HarborMapping, ConfigError> {
    let has_content = content
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with('#'));
    if !has_content {
        return Err(ConfigError::Empty {
            path: origin.to_path_buf(),
        });
    }

    let parse_error = |e: serde_yaml::Error| ConfigError::Parse {
        path: origin.to_path_buf(),
        source: e,
    };
    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(parse_error)?;
    if value.is_null() {
        return Err(ConfigError::Empty {
            path: origin.to_path_buf(),
        });
    }
    let document: MappingDocument = serde_yaml::from_value(value).map_err(parse_error)?;

    let base_url = document.harbor_base_url.unwrap_or_default();
    if base_url.trim().is_empty() {
        tracing::warn!(
            "'harbor_base_url' not found in configuration file: {}. Image references will be returned unresolved.",
            origin.display()
        );
    } else {
        tracing::info!("Harbor Base URL set to: {}", base_url);
    }

    let mappings = document.mappings.unwrap_or_default();
    for (key, fragment) in &mappings {
        if key.trim().is_empty() {
            return Err(ConfigError::InvalidEntry {
                key: key.clone(),
                reason: "image reference must not be empty".to_string(),
            });
        }
        if fragment.trim().trim_matches('/').is_empty() {
            return Err(ConfigError::InvalidEntry {
                key: key.clone(),
                reason: "path fragment must not be empty".to_string(),
            });
        }
    }

    if mappings.is_empty() {
        tracing::warn!("No image mappings found in configuration file: {}", origin.display());
    } else {
        tracing::info!("Loaded {} image mappings.", mappings.len());
    }

    Ok(HarborMapping::new(base_url.trim(), mappings))
}
