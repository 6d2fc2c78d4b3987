//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "smelt.toml";

/// Loads and validates a `smelt.toml` configuration from a project directory.
///
/// Reads `<project_dir>/smelt.toml`, parses it, and validates required fields.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Like [`load_config`], but a project without a `smelt.toml` gets the
/// built-in defaults instead of an error.
pub fn load_config_or_default(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    match load_config(project_dir) {
        Err(e) if e.is_not_found() => Ok(ProjectConfig::default()),
        other => other,
    }
}

/// Parses and validates a `smelt.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and configuration values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.main.is_empty() {
        return Err(ConfigError::EmptyField { key: "project.main" });
    }
    if config.project.sources.is_empty() {
        return Err(ConfigError::EmptyField {
            key: "project.sources",
        });
    }
    if config.compilers.is_empty() {
        return Err(ConfigError::EmptyField { key: "compilers" });
    }
    if config.deps.max_depth == 0 {
        return Err(ConfigError::InvalidValue {
            key: "deps.max_depth",
            message: "must be at least 1".to_string(),
        });
    }
    if config.compiler_for(Path::new(&config.project.main)).is_none() {
        return Err(ConfigError::NoCompilerForMain {
            main: config.project.main.clone(),
        });
    }
    Ok(())
}
