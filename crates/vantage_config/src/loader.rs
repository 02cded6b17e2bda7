//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::VantageConfig;
use std::path::Path;

/// File name looked up inside a project directory.
pub const CONFIG_FILE_NAME: &str = "vantage.toml";

/// Loads and validates a `vantage.toml` configuration from a project directory.
///
/// Reads `<project_dir>/vantage.toml`, parses it, and validates its values.
pub fn load_config(project_dir: &Path) -> Result<VantageConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `vantage.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<VantageConfig, ConfigError> {
    let config: VantageConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &VantageConfig) -> Result<(), ConfigError> {
    if config.analysis.max_path_count == 0 {
        return Err(ConfigError::ValidationError(
            "analysis.max_path_count must be positive".to_string(),
        ));
    }
    if let Some(corner) = &config.analysis.corner {
        if corner.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "analysis.corner must not be empty".to_string(),
            ));
        }
    }
    if config.logging.filter.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "logging.filter must not be empty".to_string(),
        ));
    }
    Ok(())
}
