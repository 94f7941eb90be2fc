use serde::Serialize;
use sso_config::SsoConfig;
use sso_core::Environment;

use crate::cli::{GlobalFlags, ListTarget};
use crate::commands::resolve;
use crate::context::AppContext;
use crate::output::{TextRender, output};

#[derive(Debug, Serialize)]
struct EnvironmentEntry {
    key: String,
    name: String,
    sso_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    users: usize,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct EnvironmentList(Vec<EnvironmentEntry>);

impl TextRender for EnvironmentList {
    fn render_text(&self) -> String {
        if self.0.is_empty() {
            return "(no environments configured)".to_string();
        }
        self.0
            .iter()
            .map(|env| {
                format!(
                    "{} - {} ({}) [{} user(s)]",
                    env.key, env.name, env.sso_url, env.users
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Serialize)]
struct UserEntry {
    environment: String,
    key: String,
    auth_type: &'static str,
    identifier: String,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct UserList(Vec<UserEntry>);

impl TextRender for UserList {
    fn render_text(&self) -> String {
        if self.0.is_empty() {
            return "(no users configured)".to_string();
        }
        let mut lines = Vec::new();
        let mut current: Option<&str> = None;
        for user in &self.0 {
            if current != Some(user.environment.as_str()) {
                lines.push(format!("{}:", user.environment));
                current = Some(user.environment.as_str());
            }
            lines.push(format!("  {} [{}] {}", user.key, user.auth_type, user.identifier));
        }
        lines.join("\n")
    }
}

/// Handle `sso --list env` and `sso --list user [env]`.
pub fn handle(
    target: ListTarget,
    environment: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    match target {
        ListTarget::Env => output(&environment_list(&config), flags.format),
        ListTarget::User => {
            let filter = environment
                .map(|query| resolve::existing_environment(&ctx.prompter, &config, query))
                .transpose()?;
            output(&user_list(&config, filter.as_deref()), flags.format)
        }
    }
}

fn environment_list(config: &SsoConfig) -> EnvironmentList {
    EnvironmentList(
        config
            .environments()
            .map(|env| EnvironmentEntry {
                key: env.key.clone(),
                name: env.name.clone(),
                sso_url: env.issuer_url.clone(),
                client_id: env.client_id.clone(),
                users: env.users.len(),
            })
            .collect(),
    )
}

fn user_list(config: &SsoConfig, only: Option<&str>) -> UserList {
    UserList(
        config
            .environments()
            .filter(|env| only.is_none_or(|key| env.key == key))
            .flat_map(user_entries)
            .collect(),
    )
}

fn user_entries(environment: &Environment) -> impl Iterator<Item = UserEntry> + '_ {
    environment.users.values().map(|user| UserEntry {
        environment: environment.key.clone(),
        key: user.key.clone(),
        auth_type: user.auth_kind.as_str(),
        identifier: user.identifier.clone(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::sample_config;

    #[test]
    fn environments_list_in_key_order() {
        let text = environment_list(&sample_config()).render_text();
        assert_eq!(
            text,
            "dev - Dev (https://sso.dev.example.com/realms/internal) [3 user(s)]\n\
             prod - prod (https://sso.example.com/realms/internal) [1 user(s)]"
        );
    }

    #[test]
    fn users_are_grouped_by_environment() {
        let text = user_list(&sample_config(), None).render_text();
        assert_eq!(
            text,
            "dev:\n  admin@example.com [user] admin@example.com\n  alice [user] alice@example.com\n  reporting [client] reporting-svc\n\
             prod:\n  ops [user] ops@example.com"
        );
    }

    #[test]
    fn user_list_can_be_filtered() {
        let list = user_list(&sample_config(), Some("prod"));
        assert_eq!(list.0.len(), 1);
        assert_eq!(list.0[0].key, "ops");
    }

    #[test]
    fn empty_config_lists_placeholders() {
        let config = SsoConfig::default();
        assert_eq!(environment_list(&config).render_text(), "(no environments configured)");
        assert_eq!(user_list(&config, None).render_text(), "(no users configured)");
    }

    #[test]
    fn json_environment_list_is_an_array() {
        let value = serde_json::to_value(environment_list(&sample_config())).expect("serializes");
        assert_eq!(value[1]["client_id"], "frontend");
        assert!(value[0].get("client_id").is_none());
    }
}
