//! Fakes for command tests.

use std::collections::VecDeque;
use std::sync::Mutex;

pub use sso_auth::test_support::{MemoryConfigStore, MemorySecretStore};
use sso_config::SsoConfig;
use sso_core::{Chooser, Environment, PromptError, UserIdentity};

/// Picks a fixed index (or backs out) and remembers what it was shown.
pub struct ScriptedChooser {
    answers: Mutex<VecDeque<Option<usize>>>,
    shown: Mutex<Vec<Vec<String>>>,
}

impl ScriptedChooser {
    pub fn answering(answers: &[Option<usize>]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn shown(&self) -> Vec<Vec<String>> {
        self.shown.lock().unwrap().clone()
    }
}

impl Chooser for ScriptedChooser {
    fn choose(&self, _title: &str, options: &[String]) -> Result<Option<usize>, PromptError> {
        self.shown.lock().unwrap().push(options.to_vec());
        Ok(self.answers.lock().unwrap().pop_front().flatten())
    }
}

/// `dev` (users `admin@example.com`, `alice`, `reporting`) and `prod` (user `ops`).
pub fn sample_config() -> SsoConfig {
    let mut config = SsoConfig::default();
    config.insert_environment(
        Environment::new("dev", "https://sso.dev.example.com/realms/internal")
            .with_name("Dev")
            .with_user(UserIdentity::password("admin@example.com", "admin@example.com"))
            .with_user(UserIdentity::password("alice", "alice@example.com"))
            .with_user(UserIdentity::client("reporting", "reporting-svc")),
    );
    config.insert_environment(
        Environment::new("prod", "https://sso.example.com/realms/internal")
            .with_client_id("frontend")
            .with_user(UserIdentity::password("ops", "ops@example.com")),
    );
    config
}
