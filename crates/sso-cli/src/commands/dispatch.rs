use crate::cli::{Action, GlobalFlags};
use crate::commands;
use crate::context::AppContext;

/// Dispatch a validated action to the corresponding handler module.
pub async fn dispatch(action: Action, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if needs_identities(&action) && !ctx.config_store.exists() && ctx.is_interactive() {
        eprintln!(
            "No config found at {}. Starting setup wizard.",
            ctx.config_store.path().display()
        );
        return commands::setup::run(ctx, false);
    }

    match action {
        Action::Token { environment, user } => {
            commands::token::handle(&environment, &user, ctx, flags).await
        }
        Action::Roles { environment, user } => {
            commands::roles::handle(&environment, &user, ctx, flags).await
        }
        Action::List {
            target,
            environment,
        } => commands::list::handle(target, environment.as_deref(), ctx, flags),
        Action::Remove(target) => commands::remove::handle(&target, ctx, flags),
        Action::Setup => commands::setup::run(ctx, true),
        Action::Reset => commands::setup::reset(ctx),
        Action::Interactive => commands::interactive::handle(ctx, flags).await,
    }
}

/// Actions that fetch a token and so start the wizard on a first run.
const fn needs_identities(action: &Action) -> bool {
    matches!(
        action,
        Action::Token { .. } | Action::Roles { .. } | Action::Interactive
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ListTarget, RemoveTarget};

    #[test]
    fn only_token_actions_trigger_first_run_setup() {
        assert!(needs_identities(&Action::Interactive));
        assert!(needs_identities(&Action::Token {
            environment: "dev".into(),
            user: "admin".into()
        }));
        assert!(!needs_identities(&Action::Setup));
        assert!(!needs_identities(&Action::List {
            target: ListTarget::Env,
            environment: None
        }));
        assert!(!needs_identities(&Action::Remove(RemoveTarget::Environment(
            "dev".into()
        ))));
    }
}
