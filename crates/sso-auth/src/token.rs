//! OAuth token acquisition with one round of interactive credential recovery.

use std::fmt;

use serde_json::Value;
use sso_config::{ConfigStore, DEFAULT_PASSWORD_CLIENT_ID, SsoConfig};
use sso_core::{AuthKind, Environment, SecretPrompter, SecretReason, SecretRequest, UserIdentity};

use crate::endpoints::OidcEndpoints;
use crate::error::AuthError;
use crate::secret_store::SecretStore;

/// A bearer token plus what had to change on the way to getting it.
#[derive(Clone, PartialEq, Eq)]
pub struct AcquiredToken {
    pub access_token: String,
    /// A replacement secret was entered after a 401 and written to the secret store.
    pub rotated_secret: bool,
    /// A client id was entered after a 401 and saved into the environment.
    pub captured_client_id: bool,
}

impl fmt::Debug for AcquiredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquiredToken")
            .field("access_token", &"<redacted>")
            .field("rotated_secret", &self.rotated_secret)
            .field("captured_client_id", &self.captured_client_id)
            .finish()
    }
}

enum GrantOutcome {
    Issued(String),
    Rejected,
}

/// Exchanges stored credentials for an access token.
///
/// Never creates environments or users. Recovery after a 401 may write the secret store
/// and the config store.
pub struct TokenAcquirer<'a> {
    http: reqwest::Client,
    secrets: &'a dyn SecretStore,
    prompter: &'a dyn SecretPrompter,
    config_store: &'a dyn ConfigStore,
    fallback_client_id: String,
}

impl<'a> TokenAcquirer<'a> {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        secrets: &'a dyn SecretStore,
        prompter: &'a dyn SecretPrompter,
        config_store: &'a dyn ConfigStore,
    ) -> Self {
        Self {
            http,
            secrets,
            prompter,
            config_store,
            fallback_client_id: DEFAULT_PASSWORD_CLIENT_ID.to_string(),
        }
    }

    /// Client id for password grants in environments that do not configure one.
    #[must_use]
    pub fn with_fallback_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.fallback_client_id = client_id.into();
        self
    }

    /// Obtain an access token for `user_key` in `env_key`.
    ///
    /// A missing secret is prompted for and stored before the first request. On a 401
    /// the user may supply a client id (password grants without one) and a replacement
    /// secret, then the grant is retried exactly once.
    ///
    /// # Errors
    ///
    /// - `AuthError::Config` if the identity is not in `config` or saving fails.
    /// - `AuthError::SecretNotFound` if no secret is stored and none was entered.
    /// - `AuthError::AuthenticationFailed` if the retry is rejected too.
    /// - `AuthError::Provider` for any other non-success status.
    /// - `AuthError::Transport` / `AuthError::MalformedResponse` for network or body failures.
    pub async fn acquire(
        &self,
        config: &mut SsoConfig,
        env_key: &str,
        user_key: &str,
    ) -> Result<AcquiredToken, AuthError> {
        let (environment, user) = config.identity(env_key, user_key)?;
        let (environment, user) = (environment.clone(), user.clone());

        let secret = self.ensure_secret(&environment, &user)?;
        let mut client_id = self.client_id_for(&environment, &user);

        if let GrantOutcome::Issued(access_token) =
            self.request_token(&environment, &user, &client_id, &secret).await?
        {
            return Ok(AcquiredToken {
                access_token,
                rotated_secret: false,
                captured_client_id: false,
            });
        }

        tracing::warn!(
            environment = %environment.key,
            user = %user.key,
            "credentials rejected; asking for corrections before one retry"
        );

        let mut captured_client_id = false;
        if user.auth_kind == AuthKind::Password
            && environment.client_id.is_none()
            && let Some(entered) = non_empty(self.prompter.prompt_client_id(&environment.key)?)
        {
            config.set_default_client_id(&environment.key, &entered)?;
            self.config_store.save(config)?;
            tracing::info!(
                environment = %environment.key,
                client_id = %entered,
                "saved default client id"
            );
            client_id = entered;
            captured_client_id = true;
        }

        let request = SecretRequest {
            environment: &environment.key,
            user: &user.key,
            auth_kind: user.auth_kind,
            reason: SecretReason::Rejected,
        };
        let replacement = non_empty(self.prompter.prompt_secret(&request)?);
        let rotated_secret = replacement.is_some();
        let retry_secret = match replacement {
            Some(replacement) => {
                self.secrets.set(&environment.key, &user.key, &replacement)?;
                tracing::info!(
                    environment = %environment.key,
                    user = %user.key,
                    "replaced stored secret"
                );
                replacement
            }
            None => secret,
        };

        match self
            .request_token(&environment, &user, &client_id, &retry_secret)
            .await?
        {
            GrantOutcome::Issued(access_token) => Ok(AcquiredToken {
                access_token,
                rotated_secret,
                captured_client_id,
            }),
            GrantOutcome::Rejected => Err(AuthError::AuthenticationFailed {
                environment: environment.key.clone(),
                user: user.key.clone(),
            }),
        }
    }

    /// Stored secret, or one entered now and stored with a single write.
    fn ensure_secret(
        &self,
        environment: &Environment,
        user: &UserIdentity,
    ) -> Result<String, AuthError> {
        if let Some(secret) = self.secrets.get(&environment.key, &user.key)? {
            return Ok(secret);
        }

        let request = SecretRequest {
            environment: &environment.key,
            user: &user.key,
            auth_kind: user.auth_kind,
            reason: SecretReason::Missing,
        };
        let secret = non_empty(self.prompter.prompt_secret(&request)?).ok_or_else(|| {
            AuthError::SecretNotFound {
                environment: environment.key.clone(),
                user: user.key.clone(),
            }
        })?;
        self.secrets.set(&environment.key, &user.key, &secret)?;
        tracing::info!(environment = %environment.key, user = %user.key, "stored new secret");
        Ok(secret)
    }

    fn client_id_for(&self, environment: &Environment, user: &UserIdentity) -> String {
        match user.auth_kind {
            AuthKind::ClientCredentials => user.identifier.clone(),
            AuthKind::Password => environment
                .client_id
                .clone()
                .unwrap_or_else(|| self.fallback_client_id.clone()),
        }
    }

    async fn request_token(
        &self,
        environment: &Environment,
        user: &UserIdentity,
        client_id: &str,
        secret: &str,
    ) -> Result<GrantOutcome, AuthError> {
        let form: Vec<(&str, &str)> = match user.auth_kind {
            AuthKind::ClientCredentials => vec![
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", secret),
            ],
            AuthKind::Password => vec![
                ("grant_type", "password"),
                ("client_id", client_id),
                ("username", user.identifier.as_str()),
                ("password", secret),
            ],
        };

        let url = OidcEndpoints::for_environment(environment).token();
        tracing::debug!(
            environment = %environment.key,
            user = %user.key,
            grant = user.auth_kind.as_str(),
            client_id,
            %url,
            "requesting token"
        );

        let response = self.http.post(&url).form(&form).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(GrantOutcome::Rejected);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::Provider {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| AuthError::MalformedResponse(format!("token response is not JSON: {e}")))?;
        value
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(|token| GrantOutcome::Issued(token.to_string()))
            .ok_or_else(|| AuthError::MalformedResponse("no access_token in token response".into()))
    }
}

fn non_empty(answer: Option<String>) -> Option<String> {
    answer.filter(|value| !value.trim().is_empty())
}
