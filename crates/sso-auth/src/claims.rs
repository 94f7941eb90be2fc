use std::collections::BTreeSet;

use base64::Engine as _;
use serde_json::{Map, Value};

/// Claims decoded from a token payload or returned by the provider.
///
/// Produced by [`decode_unverified`] for display only. Nothing here has been checked
/// against a signature, so it must never drive an authorization decision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenClaims {
    raw: Map<String, Value>,
}

impl TokenClaims {
    /// Wrap a JSON document. Anything but an object yields empty claims.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(raw) => Self { raw },
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[must_use]
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.raw.get(claim)
    }

    /// `preferred_username`, when present.
    #[must_use]
    pub fn preferred_username(&self) -> Option<&str> {
        self.raw.get("preferred_username").and_then(Value::as_str)
    }

    /// Roles under `realm_access.roles`.
    pub fn realm_roles(&self) -> impl Iterator<Item = &str> {
        self.raw
            .get("realm_access")
            .into_iter()
            .flat_map(role_names)
    }

    /// `(resource, role)` pairs under `resource_access.<resource>.roles`.
    pub fn resource_roles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.raw
            .get("resource_access")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|resources| resources.iter())
            .flat_map(|(resource, access)| {
                role_names(access).map(move |role| (resource.as_str(), role))
            })
    }
}

fn role_names(access: &Value) -> impl Iterator<Item = &str> {
    access
        .get("roles")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// Decode a JWT payload without verifying anything.
///
/// Tokens that do not have exactly three segments, or whose middle segment is not
/// base64url-encoded JSON, decode to empty claims. Padding is optional.
#[must_use]
pub fn decode_unverified(token: &str) -> TokenClaims {
    let segments: Vec<&str> = token.trim().split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return TokenClaims::default();
    };

    let Ok(bytes) =
        base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))
    else {
        return TokenClaims::default();
    };

    serde_json::from_slice::<Value>(&bytes)
        .map_or_else(|_| TokenClaims::default(), TokenClaims::from_value)
}

/// Realm roles plus `resource:role` for every client role, sorted and deduplicated.
#[must_use]
pub fn extract_roles(claims: &TokenClaims) -> Vec<String> {
    let realm = claims.realm_roles().map(str::to_string);
    let resources = claims
        .resource_roles()
        .map(|(resource, role)| format!("{resource}:{role}"));
    realm.chain(resources).collect::<BTreeSet<_>>().into_iter().collect()
}
