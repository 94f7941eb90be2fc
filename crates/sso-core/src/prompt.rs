//! Capabilities for asking the user things.
//!
//! The token engine and the CLI's resolution fallbacks only talk to these traits. The
//! binary supplies a terminal implementation; tests supply scripted answers.

use crate::errors::PromptError;
use crate::identity::AuthKind;

/// Why a secret is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretReason {
    /// No secret has ever been stored for this identity.
    Missing,
    /// The identity provider rejected the stored secret.
    Rejected,
}

/// Context handed to a [`SecretPrompter`].
#[derive(Debug, Clone, Copy)]
pub struct SecretRequest<'a> {
    pub environment: &'a str,
    pub user: &'a str,
    pub auth_kind: AuthKind,
    pub reason: SecretReason,
}

/// Masked secret entry and related credential questions.
pub trait SecretPrompter: Send + Sync {
    /// Ask for a secret. `Ok(None)` means the user supplied nothing.
    ///
    /// # Errors
    ///
    /// Returns `PromptError` if the prompt could not be shown or was cancelled.
    fn prompt_secret(&self, request: &SecretRequest<'_>) -> Result<Option<String>, PromptError>;

    /// Ask for a client id to send with password grants in `environment`.
    /// `Ok(None)` means the user declined.
    ///
    /// # Errors
    ///
    /// Returns `PromptError` if the prompt could not be shown or was cancelled.
    fn prompt_client_id(&self, environment: &str) -> Result<Option<String>, PromptError>;
}

/// Pick one entry from a list.
pub trait Chooser: Send + Sync {
    /// Return the index of the chosen option, or `Ok(None)` if the user backed out.
    ///
    /// # Errors
    ///
    /// Returns `PromptError` if the prompt could not be shown or was cancelled.
    fn choose(&self, title: &str, options: &[String]) -> Result<Option<usize>, PromptError>;
}
