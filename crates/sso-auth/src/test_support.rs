//! In-memory collaborators for tests of code built on `sso-auth`.
//!
//! Compiled for this crate's own tests and for dependents that enable the
//! `test-support` feature.

#![allow(clippy::missing_panics_doc, clippy::must_use_candidate)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use base64::Engine as _;
use sso_config::{ConfigError, ConfigStore, SsoConfig};
use sso_core::{Environment, PromptError, SecretPrompter, SecretReason, SecretRequest, UserIdentity};

use crate::error::AuthError;
use crate::secret_store::{SecretStore, entry_name};

#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<BTreeMap<String, String>>,
    set_calls: Mutex<usize>,
}

impl MemorySecretStore {
    pub fn with_secret(environment: &str, user: &str, secret: &str) -> Self {
        let store = Self::default();
        store
            .secrets
            .lock()
            .unwrap()
            .insert(entry_name(environment, user), secret.to_string());
        store
    }

    pub fn secret(&self, environment: &str, user: &str) -> Option<String> {
        self.secrets
            .lock()
            .unwrap()
            .get(&entry_name(environment, user))
            .cloned()
    }

    pub fn contains(&self, environment: &str, user: &str) -> bool {
        self.secret(environment, user).is_some()
    }

    pub fn count(&self) -> usize {
        self.secrets.lock().unwrap().len()
    }

    pub fn set_calls(&self) -> usize {
        *self.set_calls.lock().unwrap()
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, environment: &str, user: &str) -> Result<Option<String>, AuthError> {
        Ok(self.secret(environment, user))
    }

    fn set(&self, environment: &str, user: &str, secret: &str) -> Result<(), AuthError> {
        *self.set_calls.lock().unwrap() += 1;
        self.secrets
            .lock()
            .unwrap()
            .insert(entry_name(environment, user), secret.to_string());
        Ok(())
    }

    fn delete(&self, environment: &str, user: &str) -> Result<(), AuthError> {
        self.secrets
            .lock()
            .unwrap()
            .remove(&entry_name(environment, user));
        Ok(())
    }
}

/// Answers prompts from queues; an exhausted queue answers "nothing".
#[derive(Default)]
pub struct ScriptedPrompter {
    secrets: Mutex<VecDeque<Option<String>>>,
    client_ids: Mutex<VecDeque<Option<String>>>,
    secret_reasons: Mutex<Vec<SecretReason>>,
    client_id_prompts: Mutex<usize>,
}

impl ScriptedPrompter {
    pub fn answering_secrets(answers: &[Option<&str>]) -> Self {
        let prompter = Self::default();
        prompter
            .secrets
            .lock()
            .unwrap()
            .extend(answers.iter().map(|a| a.map(str::to_string)));
        prompter
    }

    #[must_use]
    pub fn with_client_ids(self, answers: &[Option<&str>]) -> Self {
        self.client_ids
            .lock()
            .unwrap()
            .extend(answers.iter().map(|a| a.map(str::to_string)));
        self
    }

    pub fn secret_reasons(&self) -> Vec<SecretReason> {
        self.secret_reasons.lock().unwrap().clone()
    }

    pub fn client_id_prompts(&self) -> usize {
        *self.client_id_prompts.lock().unwrap()
    }
}

impl SecretPrompter for ScriptedPrompter {
    fn prompt_secret(&self, request: &SecretRequest<'_>) -> Result<Option<String>, PromptError> {
        self.secret_reasons.lock().unwrap().push(request.reason);
        Ok(self.secrets.lock().unwrap().pop_front().flatten())
    }

    fn prompt_client_id(&self, _environment: &str) -> Result<Option<String>, PromptError> {
        *self.client_id_prompts.lock().unwrap() += 1;
        Ok(self.client_ids.lock().unwrap().pop_front().flatten())
    }
}

#[derive(Default)]
pub struct MemoryConfigStore {
    saved: Mutex<Vec<SsoConfig>>,
    read_only: bool,
}

impl MemoryConfigStore {
    /// A store whose every save fails, as an unwritable config file would.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn last_saved(&self) -> Option<SsoConfig> {
        self.saved.lock().unwrap().last().cloned()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<SsoConfig, ConfigError> {
        Ok(self.last_saved().unwrap_or_default())
    }

    fn save(&self, config: &SsoConfig) -> Result<(), ConfigError> {
        if self.read_only {
            return Err(ConfigError::Io {
                action: "write",
                path: "config.toml".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        self.saved.lock().unwrap().push(config.clone());
        Ok(())
    }
}

/// An unsigned token carrying `payload`.
pub fn make_jwt(payload: &serde_json::Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let body = engine.encode(payload.to_string());
    format!("{header}.{body}.signature")
}

/// `dev` with a password user `ann` and a client user `svc`.
pub fn sample_config(issuer: &str) -> SsoConfig {
    let mut config = SsoConfig::default();
    config.insert_environment(
        Environment::new("dev", issuer)
            .with_user(UserIdentity::password("ann", "ann@example.com"))
            .with_user(UserIdentity::client("svc", "svc-client")),
    );
    config
}
