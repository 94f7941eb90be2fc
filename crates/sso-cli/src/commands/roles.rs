use serde::Serialize;
use sso_auth::{ProviderRoles, RoleReport, SecretStore};
use sso_core::AuthKind;

use crate::cli::GlobalFlags;
use crate::commands::resolve;
use crate::context::AppContext;
use crate::output::{TextRender, bullet_list, output};

#[derive(Debug, Serialize)]
struct RolesResponse {
    environment: String,
    user: String,
    token_roles: Vec<String>,
    provider_source: &'static str,
    provider_roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    degraded: Option<String>,
}

impl RolesResponse {
    fn new(environment: String, user: String, report: RoleReport) -> Self {
        let provider_roles = report.provider.roles().to_vec();
        let degraded = match report.provider {
            ProviderRoles::Degraded { reason } => Some(reason),
            ProviderRoles::Reported(_) => None,
        };
        Self {
            environment,
            user,
            token_roles: report.token_roles,
            provider_source: report.source.label(),
            provider_roles,
            degraded,
        }
    }
}

impl TextRender for RolesResponse {
    fn render_text(&self) -> String {
        let provider = match &self.degraded {
            Some(reason) => format!("  (unavailable: {reason})"),
            None => bullet_list(&self.provider_roles, "no roles"),
        };
        format!(
            "Roles for {} on {}\n\nJWT Token:\n{}\n\n{}:\n{}",
            self.user,
            self.environment,
            bullet_list(&self.token_roles, "no roles"),
            self.provider_source,
            provider
        )
    }
}

/// Handle `sso <env> <user> --roles`.
pub async fn handle(
    environment: &str,
    user: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut config = ctx.load_config()?;
    let (env_key, user_key) = resolve::identity(ctx, &mut config, environment, user)?;

    let token = ctx.acquirer().acquire(&mut config, &env_key, &user_key).await?;

    let (environment, identity) = config.identity(&env_key, &user_key)?;
    let secret = match identity.auth_kind {
        AuthKind::ClientCredentials => ctx.secrets.get(&env_key, &user_key)?,
        AuthKind::Password => None,
    };
    let report = ctx
        .inspector()
        .reconcile_roles(environment, identity, secret.as_deref(), &token.access_token)
        .await;

    output(&RolesResponse::new(env_key, user_key, report), flags.format)
}
