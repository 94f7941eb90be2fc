//! # sso-core
//!
//! Core types shared across all sso crates:
//! - Environment and user identity types, with the closed [`AuthKind`] union
//! - Identifier resolution (exact, email local-part, then unique prefix)
//! - Capability traits for interactive prompts, so the engine runs headless in tests
//! - Cross-cutting error types

pub mod errors;
pub mod identity;
pub mod prompt;
pub mod resolve;

pub use errors::{PromptError, ResolveError};
pub use identity::{AuthKind, Environment, UserIdentity};
pub use prompt::{Chooser, SecretPrompter, SecretReason, SecretRequest};
pub use resolve::{Namespace, resolve_environment, resolve_user};
