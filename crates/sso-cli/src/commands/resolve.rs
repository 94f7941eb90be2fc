//! Identifier resolution with terminal fallbacks.
//!
//! Ambiguous queries become a menu of the matching keys. Unknown queries may become a new
//! environment or user, but only when the caller allows creation and a terminal is attached.

use anyhow::anyhow;
use sso_config::SsoConfig;
use sso_core::{Chooser, Environment, ResolveError, resolve_environment, resolve_user};

use crate::commands::setup;
use crate::context::AppContext;
use crate::ui;

/// Outcome of a resolution after the ambiguity menu.
#[derive(Debug)]
pub enum Lookup {
    Found(String),
    Missing(ResolveError),
}

/// Settle a raw resolver result, asking `chooser` to break ties.
pub fn settle(
    result: Result<String, ResolveError>,
    chooser: &dyn Chooser,
) -> anyhow::Result<Lookup> {
    match result {
        Ok(key) => Ok(Lookup::Found(key)),
        Err(ResolveError::Ambiguous {
            namespace,
            query,
            matches,
        }) => {
            let title = format!("'{query}' matches more than one {namespace}");
            match chooser.choose(&title, &matches)? {
                Some(index) => matches
                    .get(index)
                    .cloned()
                    .map(Lookup::Found)
                    .ok_or_else(|| anyhow!("menu returned an out-of-range choice")),
                None => Err(ResolveError::Ambiguous {
                    namespace,
                    query,
                    matches,
                }
                .into()),
            }
        }
        Err(missing @ ResolveError::NotFound { .. }) => Ok(Lookup::Missing(missing)),
    }
}

/// Resolve an environment that must already exist.
pub fn existing_environment(
    chooser: &dyn Chooser,
    config: &SsoConfig,
    query: &str,
) -> anyhow::Result<String> {
    let result = resolve_environment(query, config.environments()).map(|env| env.key.clone());
    match settle(result, chooser)? {
        Lookup::Found(key) => Ok(key),
        Lookup::Missing(error) => Err(error.into()),
    }
}

/// Resolve a user that must already exist.
pub fn existing_user(
    chooser: &dyn Chooser,
    environment: &Environment,
    query: &str,
) -> anyhow::Result<String> {
    let result = resolve_user(query, environment).map(|user| user.key.clone());
    match settle(result, chooser)? {
        Lookup::Found(key) => Ok(key),
        Lookup::Missing(error) => Err(error.into()),
    }
}

/// Resolve both identifiers, offering to create whichever is missing.
pub fn identity(
    ctx: &AppContext,
    config: &mut SsoConfig,
    environment_query: &str,
    user_query: &str,
) -> anyhow::Result<(String, String)> {
    let env_key = environment_or_create(ctx, config, environment_query)?;
    let user_key = user_or_create(ctx, config, &env_key, user_query)?;
    Ok((env_key, user_key))
}

fn environment_or_create(
    ctx: &AppContext,
    config: &mut SsoConfig,
    query: &str,
) -> anyhow::Result<String> {
    let result = resolve_environment(query, config.environments()).map(|env| env.key.clone());
    let error = match settle(result, &ctx.prompter)? {
        Lookup::Found(key) => return Ok(key),
        Lookup::Missing(error) => error,
    };

    if !ctx.is_interactive()
        || !ui::confirm(&format!("Environment '{query}' not found. Create it?"), true)?
    {
        return Err(error.into());
    }
    let key = setup::prompt_environment(ctx, config, Some(query))?.ok_or(error)?;
    Ok(key)
}

fn user_or_create(
    ctx: &AppContext,
    config: &mut SsoConfig,
    env_key: &str,
    query: &str,
) -> anyhow::Result<String> {
    let environment = config
        .environment(env_key)
        .ok_or_else(|| anyhow!("environment '{env_key}' disappeared from the config"))?;
    let result = resolve_user(query, environment).map(|user| user.key.clone());
    let error = match settle(result, &ctx.prompter)? {
        Lookup::Found(key) => return Ok(key),
        Lookup::Missing(error) => error,
    };

    if !ctx.is_interactive()
        || !ui::confirm(&format!("User '{query}' not found in '{env_key}'. Create it?"), true)?
    {
        return Err(error.into());
    }
    let key = setup::prompt_user(ctx, config, env_key, Some(query))?.ok_or(error)?;
    Ok(key)
}
