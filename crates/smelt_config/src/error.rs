//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `smelt.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the `smelt.toml` that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML content could not be parsed into a project configuration.
    #[error("failed to parse smelt.toml: {0}")]
    Parse(String),

    /// A setting that must have at least one value is empty.
    #[error("`{key}` must not be empty")]
    EmptyField {
        /// Dotted key of the setting, e.g. `project.sources`.
        key: &'static str,
    },

    /// A setting has a value outside its allowed range.
    #[error("invalid `{key}`: {message}")]
    InvalidValue {
        /// Dotted key of the setting, e.g. `deps.max_depth`.
        key: &'static str,
        /// What is wrong with the value.
        message: String,
    },

    /// The main file's extension has no entry in `[compilers]`, so the
    /// executable could never be linked.
    #[error("no compiler configured for main file `{main}`")]
    NoCompilerForMain {
        /// The configured main file.
        main: String,
    },
}

impl ConfigError {
    /// Returns `true` if the configuration file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
