//! Keycloak-style OpenID Connect endpoint layout under a realm issuer.

use sso_core::Environment;

#[derive(Debug, Clone, Copy)]
pub struct OidcEndpoints<'a> {
    issuer: &'a str,
}

impl<'a> OidcEndpoints<'a> {
    #[must_use]
    pub fn new(issuer: &'a str) -> Self {
        Self {
            issuer: issuer.trim_end_matches('/'),
        }
    }

    #[must_use]
    pub fn for_environment(environment: &'a Environment) -> Self {
        Self::new(environment.issuer())
    }

    #[must_use]
    pub fn token(&self) -> String {
        format!("{}/protocol/openid-connect/token", self.issuer)
    }

    #[must_use]
    pub fn introspection(&self) -> String {
        format!("{}/protocol/openid-connect/token/introspect", self.issuer)
    }

    #[must_use]
    pub fn userinfo(&self) -> String {
        format!("{}/protocol/openid-connect/userinfo", self.issuer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hang_off_the_issuer() {
        let endpoints = OidcEndpoints::new("https://sso.example.com/realms/internal/");
        assert_eq!(
            endpoints.token(),
            "https://sso.example.com/realms/internal/protocol/openid-connect/token"
        );
        assert_eq!(
            endpoints.introspection(),
            "https://sso.example.com/realms/internal/protocol/openid-connect/token/introspect"
        );
        assert_eq!(
            endpoints.userinfo(),
            "https://sso.example.com/realms/internal/protocol/openid-connect/userinfo"
        );
    }
}
