use anyhow::bail;
use serde::Serialize;
use sso_auth::SecretStore;
use sso_auth::secret_store::entry_name;
use sso_config::{ConfigError, ConfigStore, SsoConfig};
use sso_core::{Environment, UserIdentity};

use crate::cli::{GlobalFlags, RemoveTarget};
use crate::commands::resolve;
use crate::context::AppContext;
use crate::output::{TextRender, output};

#[derive(Debug, Serialize, PartialEq, Eq)]
struct RemoveResponse {
    removed: &'static str,
    environment: String,
    users: Vec<String>,
}

impl TextRender for RemoveResponse {
    fn render_text(&self) -> String {
        match self.removed {
            "environment" => format!(
                "Removed environment '{}' and {} stored secret(s)",
                self.environment,
                self.users.len()
            ),
            _ => format!(
                "Removed user '{}' from '{}'",
                self.users.join(", "),
                self.environment
            ),
        }
    }
}

/// Handle `sso --remove env <id>` and `sso --remove user <env> <id>`.
pub fn handle(target: &RemoveTarget, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut config = ctx.load_config()?;

    let response = match target {
        RemoveTarget::Environment(query) => {
            let env_key = resolve::existing_environment(&ctx.prompter, &config, query)?;
            let removed =
                remove_environment(&mut config, &ctx.config_store, &ctx.secrets, &env_key)?;
            RemoveResponse {
                removed: "environment",
                environment: env_key,
                users: removed.users.into_keys().collect(),
            }
        }
        RemoveTarget::User { environment, user } => {
            let env_key = resolve::existing_environment(&ctx.prompter, &config, environment)?;
            let user_key = match config.environment(&env_key) {
                Some(env) => resolve::existing_user(&ctx.prompter, env, user)?,
                None => return Err(ConfigError::UnknownEnvironment(env_key).into()),
            };
            let removed = remove_user(
                &mut config,
                &ctx.config_store,
                &ctx.secrets,
                &env_key,
                &user_key,
            )?;
            RemoveResponse {
                removed: "user",
                environment: env_key,
                users: vec![removed.key],
            }
        }
    };

    output(&response, flags.format)
}

/// Drop an environment and every secret stored for its users.
///
/// The config is saved before any secret is touched, so a failure leaves at worst an
/// orphaned keychain entry, never a configured identity without its secret.
pub fn remove_environment(
    config: &mut SsoConfig,
    store: &dyn ConfigStore,
    secrets: &dyn SecretStore,
    env_key: &str,
) -> anyhow::Result<Environment> {
    let environment = config
        .remove_environment(env_key)
        .ok_or_else(|| ConfigError::UnknownEnvironment(env_key.to_string()))?;
    store.save(config)?;
    tracing::info!(
        environment = %env_key,
        users = environment.users.len(),
        "environment removed"
    );
    delete_secrets(secrets, env_key, environment.users.keys())?;
    Ok(environment)
}

/// Drop one user, save, then delete its secret.
pub fn remove_user(
    config: &mut SsoConfig,
    store: &dyn ConfigStore,
    secrets: &dyn SecretStore,
    env_key: &str,
    user_key: &str,
) -> anyhow::Result<UserIdentity> {
    let user = config
        .remove_user(env_key, user_key)?
        .ok_or_else(|| ConfigError::UnknownUser {
            environment: env_key.to_string(),
            user: user_key.to_string(),
        })?;
    store.save(config)?;
    tracing::info!(environment = %env_key, user = %user_key, "user removed");
    delete_secrets(secrets, env_key, [&user.key])?;
    Ok(user)
}

/// Attempt every delete, then report the entries left behind.
fn delete_secrets<'a>(
    secrets: &dyn SecretStore,
    env_key: &str,
    user_keys: impl IntoIterator<Item = &'a String>,
) -> anyhow::Result<()> {
    let mut orphaned = Vec::new();
    for user_key in user_keys {
        if let Err(error) = secrets.delete(env_key, user_key) {
            tracing::warn!(environment = %env_key, user = %user_key, %error, "secret not deleted");
            orphaned.push(entry_name(env_key, user_key));
        }
    }
    if !orphaned.is_empty() {
        bail!(
            "config saved, but these keychain entries could not be deleted: {}",
            orphaned.join(", ")
        );
    }
    Ok(())
}
