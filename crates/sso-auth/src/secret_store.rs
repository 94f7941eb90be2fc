use crate::error::AuthError;

/// Where passwords and client secrets live.
///
/// Entries are addressed by `(environment key, user key)`; one secret per identity.
/// `get` distinguishes absence (`Ok(None)`) from a failing backend (`Err`).
pub trait SecretStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::SecretStore` if the backend cannot be queried.
    fn get(&self, environment: &str, user: &str) -> Result<Option<String>, AuthError>;

    /// Store or overwrite the secret for an identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SecretStore` if the backend rejects the write.
    fn set(&self, environment: &str, user: &str, secret: &str) -> Result<(), AuthError>;

    /// Remove the secret for an identity. Absent entries are not an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SecretStore` if the backend rejects the delete.
    fn delete(&self, environment: &str, user: &str) -> Result<(), AuthError>;
}

/// Keyring entry name for an identity: `<environment>/<user>`.
///
/// Changing this orphans every secret already stored, so it stays fixed.
#[must_use]
pub fn entry_name(environment: &str, user: &str) -> String {
    format!("{environment}/{user}")
}

/// OS keychain: macOS Keychain, Windows Credential Manager, or on Linux the Secret
/// Service with the kernel keyring as a session cache.
#[derive(Debug, Clone)]
pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, environment: &str, user: &str) -> Result<keyring::Entry, AuthError> {
        keyring::Entry::new(&self.service, &entry_name(environment, user))
            .map_err(|e| AuthError::SecretStore(format!("open {environment}/{user}: {e}")))
    }
}

impl SecretStore for KeyringSecretStore {
    fn get(&self, environment: &str, user: &str) -> Result<Option<String>, AuthError> {
        match self.entry(environment, user)?.get_password() {
            Ok(secret) if secret.is_empty() => Ok(None),
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AuthError::SecretStore(format!(
                "read {environment}/{user}: {e}"
            ))),
        }
    }

    fn set(&self, environment: &str, user: &str, secret: &str) -> Result<(), AuthError> {
        self.entry(environment, user)?
            .set_password(secret)
            .map_err(|e| AuthError::SecretStore(format!("write {environment}/{user}: {e}")))?;
        tracing::debug!(service = %self.service, environment, user, "secret stored");
        Ok(())
    }

    fn delete(&self, environment: &str, user: &str) -> Result<(), AuthError> {
        match self.entry(environment, user)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AuthError::SecretStore(format!(
                "delete {environment}/{user}: {e}"
            ))),
        }
    }
}
