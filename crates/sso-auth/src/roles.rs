//! Compare the roles a token claims with the roles the provider reports.

use serde_json::Value;
use sso_core::{AuthKind, Environment, UserIdentity};

use crate::claims::{TokenClaims, decode_unverified, extract_roles};
use crate::endpoints::OidcEndpoints;
use crate::error::AuthError;

/// The provider endpoint consulted for the second opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSource {
    /// `token/introspect`, used for client-credentials identities.
    Introspection,
    /// `userinfo`, used for password identities.
    UserInfo,
}

impl RoleSource {
    #[must_use]
    pub const fn for_auth_kind(kind: AuthKind) -> Self {
        match kind {
            AuthKind::ClientCredentials => Self::Introspection,
            AuthKind::Password => Self::UserInfo,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Introspection => "Introspection",
            Self::UserInfo => "UserInfo",
        }
    }
}

/// Roles from the provider, or why they could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRoles {
    /// The provider answered; the list may legitimately be empty.
    Reported(Vec<String>),
    /// The lookup failed. Token acquisition already succeeded, so this is not an error.
    Degraded { reason: String },
}

impl ProviderRoles {
    /// Roles to display; empty when degraded.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        match self {
            Self::Reported(roles) => roles,
            Self::Degraded { .. } => &[],
        }
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleReport {
    /// Roles asserted by the token itself (unverified).
    pub token_roles: Vec<String>,
    pub source: RoleSource,
    pub provider: ProviderRoles,
}

/// Fetches provider-side claims for role reconciliation.
#[derive(Debug, Clone)]
pub struct ClaimsInspector {
    http: reqwest::Client,
}

impl ClaimsInspector {
    #[must_use]
    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Decode the token's roles and ask the provider for its view.
    ///
    /// Client-credentials identities go through introspection, which needs `secret`.
    /// Password identities go through userinfo with the token as bearer. Any failure
    /// of the provider call ends up in [`ProviderRoles::Degraded`].
    pub async fn reconcile_roles(
        &self,
        environment: &Environment,
        user: &UserIdentity,
        secret: Option<&str>,
        token: &str,
    ) -> RoleReport {
        let token_roles = extract_roles(&decode_unverified(token));
        let source = RoleSource::for_auth_kind(user.auth_kind);

        let provider = match self.provider_claims(environment, user, secret, token).await {
            Ok(claims) => ProviderRoles::Reported(extract_roles(&claims)),
            Err(error) => {
                tracing::warn!(
                    environment = %environment.key,
                    user = %user.key,
                    source = source.label(),
                    %error,
                    "provider role lookup failed; showing token roles only"
                );
                ProviderRoles::Degraded {
                    reason: error.to_string(),
                }
            }
        };

        RoleReport {
            token_roles,
            source,
            provider,
        }
    }

    async fn provider_claims(
        &self,
        environment: &Environment,
        user: &UserIdentity,
        secret: Option<&str>,
        token: &str,
    ) -> Result<TokenClaims, AuthError> {
        let endpoints = OidcEndpoints::for_environment(environment);
        let request = match user.auth_kind {
            AuthKind::ClientCredentials => {
                let secret = secret.ok_or_else(|| AuthError::SecretNotFound {
                    environment: environment.key.clone(),
                    user: user.key.clone(),
                })?;
                self.http.post(endpoints.introspection()).form(&[
                    ("token", token),
                    ("client_id", user.identifier.as_str()),
                    ("client_secret", secret),
                ])
            }
            AuthKind::Password => self.http.get(endpoints.userinfo()).bearer_auth(token),
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::Provider {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| AuthError::MalformedResponse(format!("provider claims: {e}")))?;
        Ok(TokenClaims::from_value(value))
    }
}
