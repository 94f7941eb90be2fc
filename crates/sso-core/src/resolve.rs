//! Resolve partial user input to one configured environment or user.
//!
//! Resolution order, each step short-circuiting on a unique hit:
//!
//! ```text
//! exact key → email local-part (users only) → unique prefix of key / local-part / client id
//! ```
//!
//! Zero prefix hits is [`ResolveError::NotFound`], two or more is
//! [`ResolveError::Ambiguous`]. Both carry sorted key lists for display.

use std::fmt;

use crate::errors::ResolveError;
use crate::identity::{Environment, UserIdentity};

/// Which namespace a query was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Environment,
    User,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Environment => "environment",
            Self::User => "user",
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    key: &'a str,
    local_part: Option<&'a str>,
    client_id: Option<&'a str>,
}

impl<'a> Candidate<'a> {
    const fn environment(env: &'a Environment) -> Self {
        Self {
            key: env.key.as_str(),
            local_part: None,
            client_id: None,
        }
    }

    fn user(user: &'a UserIdentity) -> Self {
        Self {
            key: user.key.as_str(),
            local_part: user.email_local_part(),
            client_id: user.client_id(),
        }
    }

    fn has_prefix(&self, query: &str) -> bool {
        self.key.starts_with(query)
            || self.local_part.is_some_and(|local| local.starts_with(query))
            || self.client_id.is_some_and(|id| id.starts_with(query))
    }
}

/// Resolve `query` against the configured environment keys.
///
/// # Errors
///
/// Returns `ResolveError::NotFound` when nothing matches and `ResolveError::Ambiguous`
/// when more than one environment key starts with `query`.
pub fn resolve_environment<'a, I>(
    query: &str,
    environments: I,
) -> Result<&'a Environment, ResolveError>
where
    I: IntoIterator<Item = &'a Environment>,
{
    let environments: Vec<&Environment> = environments.into_iter().collect();
    let candidates: Vec<Candidate<'_>> = environments
        .iter()
        .map(|env| Candidate::environment(env))
        .collect();
    let index = resolve_index(query, Namespace::Environment, &candidates)?;
    Ok(environments[index])
}

/// Resolve `query` against the users of one environment.
///
/// Besides keys, a user matches on the local part of its email and on its client id.
///
/// # Errors
///
/// Returns `ResolveError::NotFound` when nothing matches and `ResolveError::Ambiguous`
/// when more than one user qualifies.
pub fn resolve_user<'a>(
    query: &str,
    environment: &'a Environment,
) -> Result<&'a UserIdentity, ResolveError> {
    let users: Vec<&UserIdentity> = environment.users.values().collect();
    let candidates: Vec<Candidate<'_>> = users.iter().map(|user| Candidate::user(user)).collect();
    let index = resolve_index(query, Namespace::User, &candidates)?;
    Ok(users[index])
}

fn resolve_index(
    query: &str,
    namespace: Namespace,
    candidates: &[Candidate<'_>],
) -> Result<usize, ResolveError> {
    let not_found = || ResolveError::NotFound {
        namespace,
        query: query.to_string(),
        available: sorted_keys(candidates, 0..candidates.len()),
    };

    if query.trim().is_empty() {
        return Err(not_found());
    }

    if let Some(index) = candidates.iter().position(|c| c.key == query) {
        return Ok(index);
    }

    if namespace == Namespace::User {
        let local_hits: Vec<usize> = matching(candidates, |c| c.local_part == Some(query));
        if let [index] = local_hits.as_slice() {
            return Ok(*index);
        }
    }

    let prefix_hits = matching(candidates, |c| c.has_prefix(query));
    match prefix_hits.as_slice() {
        [index] => Ok(*index),
        [] => Err(not_found()),
        _ => Err(ResolveError::Ambiguous {
            namespace,
            query: query.to_string(),
            matches: sorted_keys(candidates, prefix_hits.iter().copied()),
        }),
    }
}

fn matching(
    candidates: &[Candidate<'_>],
    predicate: impl Fn(&Candidate<'_>) -> bool,
) -> Vec<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| predicate(candidate))
        .map(|(index, _)| index)
        .collect()
}

fn sorted_keys(candidates: &[Candidate<'_>], indices: impl Iterator<Item = usize>) -> Vec<String> {
    let mut keys: Vec<String> = indices.map(|i| candidates[i].key.to_string()).collect();
    keys.sort();
    keys
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn environments() -> Vec<Environment> {
        ["dev", "demo", "prod", "staging"]
            .into_iter()
            .map(|key| Environment::new(key, format!("https://sso.{key}.example.com/realms/main")))
            .collect()
    }

    fn env_with_users() -> Environment {
        Environment::new("dev", "https://sso.dev.example.com/realms/main")
            .with_user(UserIdentity::password("admin@example.com", "admin@example.com"))
            .with_user(UserIdentity::password("alice@example.com", "alice@example.com"))
            .with_user(UserIdentity::password("al", "al@corp.example.com"))
            .with_user(UserIdentity::client("reporting", "svc-reporting"))
    }

    #[rstest]
    #[case::exact("dev", "dev")]
    #[case::unique_prefix("p", "prod")]
    #[case::unique_longer_prefix("dem", "demo")]
    #[case::full_key_of_other("staging", "staging")]
    fn environment_resolves_unique_prefix(#[case] query: &str, #[case] expected: &str) {
        let envs = environments();
        let resolved = resolve_environment(query, &envs).expect("should resolve");
        assert_eq!(resolved.key, expected);
    }

    #[test]
    fn environment_prefix_shared_by_two_keys_is_ambiguous() {
        let envs = environments();
        let err = resolve_environment("d", &envs).expect_err("should be ambiguous");
        assert_eq!(
            err,
            ResolveError::Ambiguous {
                namespace: Namespace::Environment,
                query: "d".into(),
                matches: vec!["demo".into(), "dev".into()],
            }
        );
    }

    #[test]
    fn environment_without_match_lists_available_keys() {
        let envs = environments();
        let err = resolve_environment("qa", &envs).expect_err("should not resolve");
        assert_eq!(
            err,
            ResolveError::NotFound {
                namespace: Namespace::Environment,
                query: "qa".into(),
                available: vec!["demo".into(), "dev".into(), "prod".into(), "staging".into()],
            }
        );
        assert!(err.to_string().contains("Available: demo, dev, prod, staging"));
    }

    #[test]
    fn empty_query_never_matches() {
        let envs = vec![Environment::new("only", "https://sso.example.com/realms/a")];
        assert!(matches!(
            resolve_environment("  ", &envs),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn empty_namespace_reports_none_available() {
        let envs: Vec<Environment> = Vec::new();
        let err = resolve_environment("dev", &envs).expect_err("nothing configured");
        assert!(err.to_string().ends_with("Available: (none)"));
    }

    #[test]
    fn exact_user_key_wins_over_prefix_siblings() {
        let env = env_with_users();
        // "al" is an exact key even though "alice@..." also starts with it.
        let user = resolve_user("al", &env).expect("exact key");
        assert_eq!(user.key, "al");
    }

    #[test]
    fn email_local_part_resolves_user() {
        let env = env_with_users();
        let user = resolve_user("alice", &env).expect("local part");
        assert_eq!(user.key, "alice@example.com");
    }

    #[test]
    fn client_id_prefix_resolves_user() {
        let env = env_with_users();
        let user = resolve_user("svc", &env).expect("client id prefix");
        assert_eq!(user.key, "reporting");
    }

    #[rstest]
    #[case::key_prefix("rep", "reporting")]
    #[case::local_part_prefix("adm", "admin@example.com")]
    #[case::email_local_part("admin", "admin@example.com")]
    fn user_resolution_cases(#[case] query: &str, #[case] expected: &str) {
        let env = env_with_users();
        assert_eq!(resolve_user(query, &env).expect("resolves").key, expected);
    }

    #[test]
    fn shared_user_prefix_is_ambiguous() {
        let env = env_with_users();
        let err = resolve_user("a", &env).expect_err("ambiguous");
        match err {
            ResolveError::Ambiguous { matches, namespace, .. } => {
                assert_eq!(namespace, Namespace::User);
                assert_eq!(matches, vec!["admin@example.com", "al", "alice@example.com"]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_local_parts_fall_through_to_ambiguity() {
        let env = Environment::new("dev", "https://sso.dev/realms/a")
            .with_user(UserIdentity::password("ops-a", "ops@a.example.com"))
            .with_user(UserIdentity::password("ops-b", "ops@b.example.com"));
        assert!(matches!(
            resolve_user("ops", &env),
            Err(ResolveError::Ambiguous { .. })
        ));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let env = env_with_users();
        let err = resolve_user("zed", &env).expect_err("unknown");
        assert_eq!(err.query(), "zed");
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }
}
