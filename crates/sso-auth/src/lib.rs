//! # sso-auth
//!
//! Credential handling for sso.
//!
//! Stores secrets in the OS keychain (`keyring`), exchanges them for access tokens at the
//! identity provider's token endpoint (`reqwest`), and compares the roles a token claims
//! with what the provider reports through introspection or userinfo.

pub mod claims;
pub mod endpoints;
pub mod error;
pub mod roles;
pub mod secret_store;
pub mod token;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

use std::time::Duration;

pub use claims::{TokenClaims, decode_unverified, extract_roles};
pub use endpoints::OidcEndpoints;
pub use error::AuthError;
pub use roles::{ClaimsInspector, ProviderRoles, RoleReport, RoleSource};
pub use secret_store::{KeyringSecretStore, SecretStore};
pub use token::{AcquiredToken, TokenAcquirer};

/// HTTP client shared by token acquisition and role lookups.
///
/// # Errors
///
/// Returns `AuthError::Transport` if the TLS backend cannot be initialized.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, AuthError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("sso-cli/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
