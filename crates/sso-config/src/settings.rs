//! Runtime settings, layered with figment.
//!
//! Sources (highest wins):
//! 1. Environment variables with the `SSO_` prefix (`SSO_CONFIG_PATH` → `config_path`)
//! 2. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Keyring service name all secrets are stored under.
pub const DEFAULT_KEYRING_SERVICE: &str = "sso-cli";

/// Client id sent with password grants when the environment has none configured.
/// Keycloak ships `admin-cli` as a public client with direct access grants enabled.
pub const DEFAULT_PASSWORD_CLIENT_ID: &str = "admin-cli";

/// YAML config that earlier releases kept in the home directory.
pub const LEGACY_CONFIG_FILE_NAME: &str = "sso_config.yaml";

const CONFIG_DIR_NAME: &str = "sso-cli";
const CONFIG_FILE_NAME: &str = "config.toml";

const fn default_http_timeout_secs() -> u64 {
    30
}

fn default_keyring_service() -> String {
    DEFAULT_KEYRING_SERVICE.to_string()
}

fn default_password_client_id() -> String {
    DEFAULT_PASSWORD_CLIENT_ID.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Explicit location of the environment/identity file.
    #[serde(default)]
    pub config_path: Option<PathBuf>,

    /// Keyring service name. Override for tests to keep production secrets untouched.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Fallback client id for password grants.
    #[serde(default = "default_password_client_id")]
    pub password_client_id: String,

    /// Timeout applied to every identity-provider request.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: None,
            keyring_service: default_keyring_service(),
            password_client_id: default_password_client_id(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Settings {
    /// Load settings from defaults and `SSO_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if an environment value has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can extract from it directly or layer providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed("SSO_"))
    }

    /// Where the environment/identity file lives.
    ///
    /// `config_path` when set, otherwise `<platform config dir>/sso-cli/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` if no override is set and the platform has no
    /// config directory.
    pub fn config_file_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = self.config_path.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            return Ok(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// `~/sso_config.yaml` when it exists and `config_path` does not.
    #[must_use]
    pub fn stranded_legacy_config(config_path: &Path) -> Option<PathBuf> {
        dirs::home_dir().and_then(|home| stranded_legacy_config_in(config_path, &home))
    }
}

fn stranded_legacy_config_in(config_path: &Path, home: &Path) -> Option<PathBuf> {
    let legacy = home.join(LEGACY_CONFIG_FILE_NAME);
    (!config_path.exists() && legacy.is_file()).then_some(legacy)
}
