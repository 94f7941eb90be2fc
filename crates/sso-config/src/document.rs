//! The environment/identity document.
//!
//! ```toml
//! [environments.dev]
//! name = "Dev"
//! sso_url = "https://sso.dev.example.com/realms/internal"
//! client_id = "frontend"        # optional
//!
//! [environments.dev.users."admin@example.com"]
//! auth_type = "user"
//! email = "admin@example.com"
//!
//! [environments.dev.users.reporting]
//! auth_type = "client"
//! client_id = "reporting"
//! ```
//!
//! The file never holds secrets. Parsing goes through loose `Raw*` shapes so missing
//! fields surface as `ConfigError::MissingField` with a dotted path instead of a serde
//! message, and legacy `auth_type` spellings are normalized here once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sso_core::identity::is_absolute_http_url;
use sso_core::{AuthKind, Environment, UserIdentity};

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize, Serialize)]
struct RawDocument {
    #[serde(default)]
    environments: BTreeMap<String, RawEnvironment>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RawEnvironment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sso_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(default)]
    users: BTreeMap<String, RawUser>,
}

#[derive(Debug, Deserialize, Serialize)]
struct RawUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_type: Option<AuthKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
}

/// All configured environments, keyed by environment key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SsoConfig {
    environments: BTreeMap<String, Environment>,
}

impl SsoConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or an unknown `auth_type`, and
    /// `ConfigError::MissingField` / `ConfigError::InvalidValue` for schema violations.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RawDocument = toml::from_str(input)?;
        let mut environments = BTreeMap::new();
        for (key, raw_env) in raw.environments {
            let environment = environment_from_raw(&key, raw_env)?;
            environments.insert(key, environment);
        }
        Ok(Self { environments })
    }

    /// Render the document as TOML.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` if TOML serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let raw = RawDocument {
            environments: self
                .environments
                .iter()
                .map(|(key, env)| (key.clone(), environment_to_raw(env)))
                .collect(),
        };
        Ok(toml::to_string_pretty(&raw)?)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    pub fn environments(&self) -> impl Iterator<Item = &Environment> {
        self.environments.values()
    }

    #[must_use]
    pub fn environment(&self, key: &str) -> Option<&Environment> {
        self.environments.get(key)
    }

    pub fn environment_mut(&mut self, key: &str) -> Option<&mut Environment> {
        self.environments.get_mut(key)
    }

    /// Look up an environment and one of its users by canonical keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownEnvironment` or `ConfigError::UnknownUser`.
    pub fn identity(
        &self,
        env_key: &str,
        user_key: &str,
    ) -> Result<(&Environment, &UserIdentity), ConfigError> {
        let environment = self
            .environment(env_key)
            .ok_or_else(|| ConfigError::UnknownEnvironment(env_key.to_string()))?;
        let user = environment.user(user_key).ok_or_else(|| ConfigError::UnknownUser {
            environment: env_key.to_string(),
            user: user_key.to_string(),
        })?;
        Ok((environment, user))
    }

    /// Insert or replace an environment (including its users).
    pub fn insert_environment(&mut self, environment: Environment) -> Option<Environment> {
        self.environments.insert(environment.key.clone(), environment)
    }

    pub fn remove_environment(&mut self, key: &str) -> Option<Environment> {
        self.environments.remove(key)
    }

    /// Insert or replace a user inside an existing environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownEnvironment` if `env_key` is not configured.
    pub fn insert_user(&mut self, env_key: &str, user: UserIdentity) -> Result<(), ConfigError> {
        self.environment_mut(env_key)
            .ok_or_else(|| ConfigError::UnknownEnvironment(env_key.to_string()))?
            .insert_user(user);
        Ok(())
    }

    /// Remove a user, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownEnvironment` if `env_key` is not configured.
    pub fn remove_user(
        &mut self,
        env_key: &str,
        user_key: &str,
    ) -> Result<Option<UserIdentity>, ConfigError> {
        Ok(self
            .environment_mut(env_key)
            .ok_or_else(|| ConfigError::UnknownEnvironment(env_key.to_string()))?
            .remove_user(user_key))
    }

    /// Record the client id password grants in `env_key` should use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownEnvironment` if `env_key` is not configured.
    pub fn set_default_client_id(
        &mut self,
        env_key: &str,
        client_id: &str,
    ) -> Result<(), ConfigError> {
        self.environment_mut(env_key)
            .ok_or_else(|| ConfigError::UnknownEnvironment(env_key.to_string()))?
            .client_id = Some(client_id.to_string());
        Ok(())
    }
}

fn environment_from_raw(key: &str, raw: RawEnvironment) -> Result<Environment, ConfigError> {
    let sso_url = raw
        .sso_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingField {
            field: format!("environments.{key}.sso_url"),
        })?;
    if !is_absolute_http_url(&sso_url) {
        return Err(ConfigError::InvalidValue {
            field: format!("environments.{key}.sso_url"),
            reason: format!("'{sso_url}' is not an absolute http(s) URL"),
        });
    }

    let mut environment = Environment::new(key, sso_url.trim().trim_end_matches('/'));
    if let Some(name) = raw.name.filter(|name| !name.trim().is_empty()) {
        environment.name = name;
    }
    environment.client_id = raw.client_id.filter(|id| !id.trim().is_empty());

    for (user_key, raw_user) in raw.users {
        let user = user_from_raw(key, &user_key, raw_user)?;
        environment.insert_user(user);
    }

    Ok(environment)
}

fn user_from_raw(env_key: &str, user_key: &str, raw: RawUser) -> Result<UserIdentity, ConfigError> {
    let field = |name: &str| format!("environments.{env_key}.users.{user_key}.{name}");

    let auth_kind = raw.auth_type.ok_or_else(|| ConfigError::MissingField {
        field: field("auth_type"),
    })?;

    let (identifier, field_name) = match auth_kind {
        AuthKind::Password => (raw.email, "email"),
        AuthKind::ClientCredentials => (raw.client_id, "client_id"),
    };
    let identifier = identifier
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingField {
            field: field(field_name),
        })?;

    Ok(UserIdentity {
        key: user_key.to_string(),
        auth_kind,
        identifier,
    })
}

fn environment_to_raw(environment: &Environment) -> RawEnvironment {
    RawEnvironment {
        name: Some(environment.name.clone()),
        sso_url: Some(environment.issuer_url.clone()),
        client_id: environment.client_id.clone(),
        users: environment
            .users
            .iter()
            .map(|(key, user)| {
                let raw = RawUser {
                    auth_type: Some(user.auth_kind),
                    email: user.email().map(str::to_string),
                    client_id: user.client_id().map(str::to_string),
                };
                (key.clone(), raw)
            })
            .collect(),
    }
}
