use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::commands::resolve;
use crate::context::AppContext;
use crate::output::{TextRender, output};

#[derive(Serialize)]
pub struct TokenResponse {
    pub environment: String,
    pub user: String,
    pub access_token: String,
}

impl TextRender for TokenResponse {
    /// The bare token, so `$(sso dev admin)` works.
    fn render_text(&self) -> String {
        self.access_token.clone()
    }
}

/// Handle `sso <env> <user>`.
pub async fn handle(
    environment: &str,
    user: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut config = ctx.load_config()?;
    let (env_key, user_key) = resolve::identity(ctx, &mut config, environment, user)?;

    let token = ctx.acquirer().acquire(&mut config, &env_key, &user_key).await?;

    output(
        &TokenResponse {
            environment: env_key,
            user: user_key,
            access_token: token.access_token,
        },
        flags.format,
    )
}
