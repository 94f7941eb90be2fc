//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// No configuration file exists yet.
    #[error("No config found at {}. Run `sso --setup` to create one.", .path.display())]
    Missing { path: PathBuf },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized for saving.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Reading, writing, or moving the configuration file failed.
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required field is absent from the document.
    #[error("Invalid config: '{field}' is missing")]
    MissingField { field: String },

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Environment '{0}' is not configured")]
    UnknownEnvironment(String),

    #[error("User '{user}' is not configured in environment '{environment}'")]
    UnknownUser { environment: String, user: String },

    /// Neither `SSO_CONFIG_PATH` nor a platform config directory is available.
    #[error("Cannot determine config location: set SSO_CONFIG_PATH")]
    NoConfigDir,
}
