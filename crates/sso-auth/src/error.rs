use sso_config::ConfigError;
use sso_core::PromptError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no secret stored for {environment}/{user}; run `sso --setup` to provide one")]
    SecretNotFound { environment: String, user: String },

    #[error("authentication failed for {environment}/{user}: credentials rejected after retry")]
    AuthenticationFailed { environment: String, user: String },

    #[error("identity provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    #[error("keyring error: {0}")]
    SecretStore(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}
