//! Drill-down setup wizard for environments, users and their secrets.
//!
//! The config document is saved after every change. A secret goes to the keychain only
//! once the user it belongs to is on disk.

use anyhow::bail;
use sso_auth::SecretStore;
use sso_config::{ConfigStore, SsoConfig};
use sso_core::identity::normalize_issuer_url;
use sso_core::{AuthKind, Environment, UserIdentity};

use crate::commands::remove;
use crate::context::AppContext;
use crate::ui;

const ADD_ENVIRONMENT: &str = "[+] Add environment";
const ADD_USER: &str = "[+] Add user";
const EDIT_SECRET: &str = "[e] Edit secret";
const DELETE_USER: &str = "[-] Delete user";
const BACK: &str = "[<] Back";
const SAVE_QUIT: &str = "[q] Save & quit";

/// Run the wizard. `append` edits the existing config; otherwise it starts empty.
pub fn run(ctx: &AppContext, append: bool) -> anyhow::Result<()> {
    if !ctx.is_interactive() {
        bail!("setup needs an interactive terminal");
    }

    let mut config = if append {
        ctx.config_store.load_or_default()?
    } else {
        SsoConfig::default()
    };

    eprintln!();
    eprintln!("SSO config manager ({})", ctx.config_store.path().display());
    eprintln!("Arrow keys to navigate, Enter to select, Esc to go back.");
    eprintln!("Secrets are stored in the OS keychain and never written to disk.");

    if config.is_empty() {
        eprintln!("\nNo environments yet; adding the first one.");
        add_environment(ctx, &mut config)?;
    }

    loop {
        let keys: Vec<String> = config.environments().map(|env| env.key.clone()).collect();
        let mut options: Vec<String> = config
            .environments()
            .map(|env| format!("{}  ({} user(s))", env.key, env.users.len()))
            .collect();
        options.push(ADD_ENVIRONMENT.to_string());
        options.push(SAVE_QUIT.to_string());

        match ui::select("Environments", &options)? {
            Some(index) if index < keys.len() => environment_menu(ctx, &mut config, &keys[index])?,
            Some(index) if index == keys.len() => add_environment(ctx, &mut config)?,
            _ => break,
        }
    }

    ctx.save_config(&config)?;
    eprintln!("\nConfig saved to {}", ctx.config_store.path().display());
    Ok(())
}

/// Back up the current config, then start the wizard from scratch.
pub fn reset(ctx: &AppContext) -> anyhow::Result<()> {
    if !ctx.is_interactive() {
        bail!("reset needs an interactive terminal");
    }
    if let Some(backup) = ctx.config_store.backup()? {
        eprintln!("Backed up existing config to: {}", backup.display());
    }
    run(ctx, false)
}

fn add_environment(ctx: &AppContext, config: &mut SsoConfig) -> anyhow::Result<()> {
    if let Some(env_key) = prompt_environment(ctx, config, None)? {
        prompt_user(ctx, config, &env_key, None)?;
    }
    Ok(())
}

/// Ask for an environment, insert it and save. `Ok(None)` if the key or URL was left blank.
///
/// Re-entering an existing key replaces its settings and keeps its users.
pub fn prompt_environment(
    ctx: &AppContext,
    config: &mut SsoConfig,
    default_key: Option<&str>,
) -> anyhow::Result<Option<String>> {
    let key = ui::input("  Environment key (e.g. dev, prod)", default_key)?;
    if key.is_empty() {
        return Ok(None);
    }
    let base = ui::input("  SSO base URL (e.g. sso.example.com)", None)?;
    if base.is_empty() {
        return Ok(None);
    }
    let realm = ui::input("  Realm name", Some("master"))?;
    let issuer = normalize_issuer_url(&base, Some(&realm));
    eprintln!("  -> {issuer}");

    let name = ui::input("  Display name", Some(&key))?;
    let client_id = ui::input("  Client id for password logins (Enter for the default)", None)?;

    let mut environment = Environment::new(&key, issuer);
    if !name.is_empty() {
        environment = environment.with_name(name);
    }
    if !client_id.is_empty() {
        environment = environment.with_client_id(client_id);
    }
    register_environment(&ctx.config_store, config, environment).map(Some)
}

/// Ask for a user, save it, then store its secret. `Ok(None)` if the user backed out.
///
/// The new user's key is `default_key` when given, otherwise its email or client id.
pub fn prompt_user(
    ctx: &AppContext,
    config: &mut SsoConfig,
    env_key: &str,
    default_key: Option<&str>,
) -> anyhow::Result<Option<String>> {
    let kinds = [
        "user (email + password)".to_string(),
        "client (client id + secret)".to_string(),
    ];
    let auth_kind = match ui::select("  Auth type", &kinds)? {
        Some(0) => AuthKind::Password,
        Some(_) => AuthKind::ClientCredentials,
        None => return Ok(None),
    };

    let (identifier_label, secret_label) = match auth_kind {
        AuthKind::Password => ("  Email", "  Password"),
        AuthKind::ClientCredentials => ("  Client ID", "  Client secret"),
    };
    let identifier = ui::input(identifier_label, default_key)?;
    if identifier.is_empty() {
        return Ok(None);
    }
    let key = default_key.unwrap_or(&identifier).to_string();

    let user = match auth_kind {
        AuthKind::Password => UserIdentity::password(&key, &identifier),
        AuthKind::ClientCredentials => UserIdentity::client(&key, &identifier),
    };
    let secret = ui::secret(secret_label)?;
    register_user(&ctx.config_store, &ctx.secrets, config, env_key, user, &secret)?;
    if secret.is_empty() {
        eprintln!("  No secret stored; you will be asked on first use.");
    } else {
        eprintln!("  Keychain updated: {env_key}/{key}");
    }
    Ok(Some(key))
}

/// Insert `environment`, keeping the users of any environment it replaces, and save.
fn register_environment(
    store: &dyn ConfigStore,
    config: &mut SsoConfig,
    mut environment: Environment,
) -> anyhow::Result<String> {
    if let Some(existing) = config.environment(&environment.key) {
        environment.users = existing.users.clone();
    }
    let key = environment.key.clone();
    config.insert_environment(environment);
    store.save(config)?;
    tracing::info!(environment = %key, "environment saved");
    Ok(key)
}

/// Insert `user` and save; an empty `secret` leaves the keychain alone.
fn register_user(
    store: &dyn ConfigStore,
    secrets: &dyn SecretStore,
    config: &mut SsoConfig,
    env_key: &str,
    user: UserIdentity,
    secret: &str,
) -> anyhow::Result<()> {
    let key = user.key.clone();
    config.insert_user(env_key, user)?;
    store.save(config)?;
    tracing::info!(environment = %env_key, user = %key, "user saved");
    if !secret.is_empty() {
        secrets.set(env_key, &key, secret)?;
    }
    Ok(())
}

fn environment_menu(ctx: &AppContext, config: &mut SsoConfig, env_key: &str) -> anyhow::Result<()> {
    let delete_environment = format!("[-] Delete environment '{env_key}'");
    loop {
        let Some(environment) = config.environment(env_key) else {
            return Ok(());
        };
        let keys: Vec<String> = environment.users.keys().cloned().collect();
        let mut options: Vec<String> = environment
            .users
            .values()
            .map(|user| format!("{}  [{}]", user.key, user.auth_kind))
            .collect();
        options.push(ADD_USER.to_string());
        options.push(delete_environment.clone());
        options.push(BACK.to_string());

        match ui::select(&format!("Environment: {env_key}"), &options)? {
            Some(index) if index < keys.len() => user_menu(ctx, config, env_key, &keys[index])?,
            Some(index) if index == keys.len() => {
                prompt_user(ctx, config, env_key, None)?;
            }
            Some(index) if index == keys.len() + 1 => {
                let removed =
                    remove::remove_environment(config, &ctx.config_store, &ctx.secrets, env_key)?;
                eprintln!(
                    "  Deleted environment '{env_key}' and {} secret(s)",
                    removed.users.len()
                );
                return Ok(());
            }
            _ => return Ok(()),
        }
    }
}

fn user_menu(
    ctx: &AppContext,
    config: &mut SsoConfig,
    env_key: &str,
    user_key: &str,
) -> anyhow::Result<()> {
    let options = [EDIT_SECRET.to_string(), DELETE_USER.to_string(), BACK.to_string()];
    loop {
        match ui::select(&format!("{env_key} / {user_key}"), &options)? {
            Some(0) => {
                let secret = ui::secret(&format!("  New secret for {user_key}"))?;
                if secret.is_empty() {
                    eprintln!("  Unchanged.");
                } else {
                    ctx.secrets.set(env_key, user_key, &secret)?;
                    eprintln!("  Updated: {env_key}/{user_key}");
                }
            }
            Some(1) => {
                remove::remove_user(config, &ctx.config_store, &ctx.secrets, env_key, user_key)?;
                eprintln!("  Deleted user '{user_key}'");
                return Ok(());
            }
            _ => return Ok(()),
        }
    }
}
