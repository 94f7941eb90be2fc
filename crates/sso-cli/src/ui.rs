//! Terminal prompts on stderr via `dialoguer`.
//!
//! Every prompt draws on stderr so a token on stdout can be piped. Without a terminal
//! the prompter answers "nothing" and callers fall back to their non-interactive path.

use std::io::IsTerminal;

use dialoguer::{Confirm, Input, Password, Select};
use sso_core::{Chooser, PromptError, SecretPrompter, SecretReason, SecretRequest};

/// Whether prompts can be shown at all.
#[must_use]
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

fn terminal(error: dialoguer::Error) -> PromptError {
    PromptError::Terminal(error.to_string())
}

/// Free-text answer; empty input is allowed and returned as-is (trimmed).
pub fn input(prompt: &str, default: Option<&str>) -> Result<String, PromptError> {
    let mut question = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if let Some(default) = default {
        question = question.default(default.to_string());
    }
    Ok(question.interact_text().map_err(terminal)?.trim().to_string())
}

/// Masked answer. Empty input is allowed.
pub fn secret(prompt: &str) -> Result<String, PromptError> {
    Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(terminal)
}

pub fn confirm(prompt: &str, default: bool) -> Result<bool, PromptError> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(terminal)
}

/// Arrow-key menu. `Ok(None)` when the user presses Esc or `q`.
pub fn select(title: &str, options: &[String]) -> Result<Option<usize>, PromptError> {
    if options.is_empty() {
        return Ok(None);
    }
    Select::new()
        .with_prompt(title)
        .items(options)
        .default(0)
        .interact_opt()
        .map_err(terminal)
}

/// [`SecretPrompter`] and [`Chooser`] backed by the terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompter {
    interactive: bool,
}

impl TerminalPrompter {
    #[must_use]
    pub fn detect() -> Self {
        Self {
            interactive: is_interactive(),
        }
    }

    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.interactive
    }
}

fn secret_prompt(request: &SecretRequest<'_>) -> String {
    let label = request.auth_kind.secret_label();
    let target = format!("{} on {}", request.user, request.environment);
    match request.reason {
        SecretReason::Missing => format!("Enter {label} for {target}"),
        SecretReason::Rejected => {
            format!("Rejected. New {label} for {target} (Enter to retry the stored one)")
        }
    }
}

impl SecretPrompter for TerminalPrompter {
    fn prompt_secret(&self, request: &SecretRequest<'_>) -> Result<Option<String>, PromptError> {
        if !self.interactive {
            return Ok(None);
        }
        let answer = secret(&secret_prompt(request))?;
        Ok(Some(answer).filter(|value| !value.trim().is_empty()))
    }

    fn prompt_client_id(&self, environment: &str) -> Result<Option<String>, PromptError> {
        if !self.interactive {
            return Ok(None);
        }
        let answer = input(
            &format!("Client id for password logins on {environment} (Enter to skip)"),
            None,
        )?;
        Ok(Some(answer).filter(|value| !value.is_empty()))
    }
}

impl Chooser for TerminalPrompter {
    fn choose(&self, title: &str, options: &[String]) -> Result<Option<usize>, PromptError> {
        if !self.interactive {
            return Ok(None);
        }
        select(title, options)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use sso_core::AuthKind;

    use super::*;

    #[test]
    fn missing_secret_prompt_names_the_identity() {
        let request = SecretRequest {
            environment: "dev",
            user: "admin",
            auth_kind: AuthKind::Password,
            reason: SecretReason::Missing,
        };
        let prompt = secret_prompt(&request);
        assert!(prompt.contains("admin on dev"), "{prompt}");
    }

    #[test]
    fn rejected_secret_prompt_offers_to_keep_stored_one() {
        let request = SecretRequest {
            environment: "dev",
            user: "svc",
            auth_kind: AuthKind::ClientCredentials,
            reason: SecretReason::Rejected,
        };
        let prompt = secret_prompt(&request);
        assert!(prompt.starts_with("Rejected."));
        assert!(prompt.contains("Enter to retry"));
    }

    #[test]
    fn non_interactive_prompter_answers_nothing() {
        let prompter = TerminalPrompter { interactive: false };
        let request = SecretRequest {
            environment: "dev",
            user: "admin",
            auth_kind: AuthKind::Password,
            reason: SecretReason::Missing,
        };
        assert_eq!(prompter.prompt_secret(&request).expect("no prompt"), None);
        assert_eq!(prompter.prompt_client_id("dev").expect("no prompt"), None);
        assert_eq!(
            prompter.choose("pick", &["a".to_string()]).expect("no prompt"),
            None
        );
    }
}
