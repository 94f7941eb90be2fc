//! Cross-cutting error types for sso.
//!
//! Domain-specific errors (`ConfigError`, `AuthError`) are defined in their respective
//! crates. They converge into `anyhow::Error` in `sso-cli`.

use thiserror::Error;

use crate::resolve::Namespace;

/// Identifier resolution failed.
///
/// Both variants are recoverable by the caller: show the match list, let the user pick,
/// or treat the query as a new key in creation flows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{namespace} '{query}' not found. Available: {}", display_list(.available))]
    NotFound {
        namespace: Namespace,
        query: String,
        available: Vec<String>,
    },

    #[error("ambiguous {namespace} '{query}'. Matches: {}", .matches.join(", "))]
    Ambiguous {
        namespace: Namespace,
        query: String,
        matches: Vec<String>,
    },
}

impl ResolveError {
    #[must_use]
    pub fn query(&self) -> &str {
        match self {
            Self::NotFound { query, .. } | Self::Ambiguous { query, .. } => query,
        }
    }
}

fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

/// An interactive prompt could not be completed.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The user aborted the prompt (Ctrl-C, Esc).
    #[error("prompt cancelled")]
    Cancelled,

    /// The terminal could not be read or written.
    #[error("terminal prompt failed: {0}")]
    Terminal(String),
}
