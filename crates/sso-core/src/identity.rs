//! Environments and the user identities provisioned inside them.
//!
//! None of these types carry secrets. Passwords and client secrets are addressed by
//! `(environment key, user key)` in the OS secret store and never travel with these values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AuthKind
// ---------------------------------------------------------------------------

/// Which OAuth grant a user identity authenticates with.
///
/// Serialized as `"user"` / `"client"`. The legacy spellings `"password"` and
/// `"client_credentials"` are accepted on load and rewritten on the next save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthKind {
    /// Resource-owner password grant; the identifier is an email address.
    #[serde(rename = "user", alias = "password")]
    Password,
    /// Client-credentials grant; the identifier is a client id.
    #[serde(rename = "client", alias = "client_credentials")]
    ClientCredentials,
}

impl AuthKind {
    /// Return the string representation used in the config file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Password => "user",
            Self::ClientCredentials => "client",
        }
    }

    /// Human label for the secret this kind of identity holds.
    #[must_use]
    pub const fn secret_label(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::ClientCredentials => "client secret",
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UserIdentity
// ---------------------------------------------------------------------------

/// A user (or service client) provisioned inside one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    /// Unique within the owning environment.
    pub key: String,
    pub auth_kind: AuthKind,
    /// Email for [`AuthKind::Password`], client id for [`AuthKind::ClientCredentials`].
    pub identifier: String,
}

impl UserIdentity {
    #[must_use]
    pub fn password(key: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            auth_kind: AuthKind::Password,
            identifier: email.into(),
        }
    }

    #[must_use]
    pub fn client(key: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            auth_kind: AuthKind::ClientCredentials,
            identifier: client_id.into(),
        }
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self.auth_kind {
            AuthKind::Password => Some(&self.identifier),
            AuthKind::ClientCredentials => None,
        }
    }

    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        match self.auth_kind {
            AuthKind::ClientCredentials => Some(&self.identifier),
            AuthKind::Password => None,
        }
    }

    /// The part of the email before `@`, if this identity has an email.
    #[must_use]
    pub fn email_local_part(&self) -> Option<&str> {
        self.email()
            .and_then(|email| email.split_once('@').map(|(local, _)| local))
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// One identity-provider realm the user can fetch tokens from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// User-chosen slug, unique across the configuration.
    pub key: String,
    pub name: String,
    /// Realm-specific issuer, e.g. `https://sso.example.com/realms/internal`.
    pub issuer_url: String,
    /// Client id sent with password grants. Falls back to a deployment constant when unset.
    pub client_id: Option<String>,
    pub users: BTreeMap<String, UserIdentity>,
}

impl Environment {
    #[must_use]
    pub fn new(key: impl Into<String>, issuer_url: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            issuer_url: issuer_url.into(),
            client_id: None,
            users: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: UserIdentity) -> Self {
        self.insert_user(user);
        self
    }

    #[must_use]
    pub fn user(&self, key: &str) -> Option<&UserIdentity> {
        self.users.get(key)
    }

    /// Insert or replace a user, returning the replaced identity.
    pub fn insert_user(&mut self, user: UserIdentity) -> Option<UserIdentity> {
        self.users.insert(user.key.clone(), user)
    }

    pub fn remove_user(&mut self, key: &str) -> Option<UserIdentity> {
        self.users.remove(key)
    }

    /// Issuer URL without a trailing slash, ready for endpoint paths to be appended.
    #[must_use]
    pub fn issuer(&self) -> &str {
        self.issuer_url.trim_end_matches('/')
    }
}

// ---------------------------------------------------------------------------
// Issuer URL helpers
// ---------------------------------------------------------------------------

/// Whether `value` is an absolute `http`/`https` URL with a non-empty host.
#[must_use]
pub fn is_absolute_http_url(value: &str) -> bool {
    value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .and_then(|rest| rest.split('/').next())
        .is_some_and(|host| !host.is_empty())
}

/// Normalize user input into a full issuer URL.
///
/// Adds `https://` when no scheme is given and drops trailing slashes. When `realm` is
/// given and the URL does not already name a realm, `/realms/<realm>` is appended.
#[must_use]
pub fn normalize_issuer_url(raw: &str, realm: Option<&str>) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let mut url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    if let Some(realm) = realm.map(str::trim).filter(|realm| !realm.is_empty())
        && !url.contains("/realms/")
    {
        url.push_str("/realms/");
        url.push_str(realm);
    }

    url
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn email_local_part_only_for_password_identities() {
        let user = UserIdentity::password("admin", "admin@example.com");
        assert_eq!(user.email_local_part(), Some("admin"));
        assert_eq!(user.client_id(), None);

        let client = UserIdentity::client("reporting", "reporting-svc");
        assert_eq!(client.email_local_part(), None);
        assert_eq!(client.client_id(), Some("reporting-svc"));
    }

    #[test]
    fn email_without_at_sign_has_no_local_part() {
        let user = UserIdentity::password("odd", "not-an-email");
        assert_eq!(user.email_local_part(), None);
    }

    #[test]
    fn auth_kind_display_matches_config_spelling() {
        assert_eq!(AuthKind::Password.to_string(), "user");
        assert_eq!(AuthKind::ClientCredentials.to_string(), "client");
    }

    #[test]
    fn environment_name_defaults_to_key() {
        let env = Environment::new("dev", "https://sso.dev/realms/x");
        assert_eq!(env.name, "dev");
        assert_eq!(env.with_name("Development").name, "Development");
    }

    #[test]
    fn issuer_strips_trailing_slash() {
        let env = Environment::new("dev", "https://sso.dev/realms/x/");
        assert_eq!(env.issuer(), "https://sso.dev/realms/x");
    }

    #[test]
    fn normalize_issuer_adds_scheme_and_realm() {
        assert_eq!(
            normalize_issuer_url("sso.example.com/", Some("internal")),
            "https://sso.example.com/realms/internal"
        );
    }

    #[test]
    fn normalize_issuer_keeps_existing_realm() {
        assert_eq!(
            normalize_issuer_url("http://localhost:8080/realms/master", Some("other")),
            "http://localhost:8080/realms/master"
        );
    }

    #[test]
    fn absolute_url_check() {
        assert!(is_absolute_http_url("https://sso.example.com/realms/a"));
        assert!(is_absolute_http_url("http://127.0.0.1:8080"));
        assert!(!is_absolute_http_url("sso.example.com"));
        assert!(!is_absolute_http_url("https://"));
    }
}
