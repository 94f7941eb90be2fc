use anyhow::{anyhow, bail};
use sso_auth::decode_unverified;
use sso_core::Chooser;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::clipboard::{Clipboard, SystemClipboard};
use crate::commands::token::TokenResponse;
use crate::context::AppContext;
use crate::output::output;

/// Where the token ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Copied,
    Printed,
}

/// Handle bare `sso`: pick an environment and a user from menus, then fetch a token.
///
/// In text mode the token goes to the clipboard when stdout is a terminal, and is
/// printed when copying is not possible.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !ctx.is_interactive() {
        bail!("no terminal attached; pass an environment and a user, e.g. `sso dev admin`");
    }

    let mut config = ctx.load_config()?;
    if config.is_empty() {
        bail!("no environments configured; run `sso --setup`");
    }

    let env_keys: Vec<String> = config.environments().map(|env| env.key.clone()).collect();
    let env_labels: Vec<String> = config
        .environments()
        .map(|env| format!("{} ({})", env.name, env.key))
        .collect();
    let Some(env_index) = ctx.prompter.choose("Select environment", &env_labels)? else {
        return Ok(());
    };
    let env_key = env_keys
        .get(env_index)
        .cloned()
        .ok_or_else(|| anyhow!("menu returned an out-of-range choice"))?;

    let user_keys: Vec<String> = config
        .environment(&env_key)
        .map(|env| env.users.keys().cloned().collect())
        .unwrap_or_default();
    if user_keys.is_empty() {
        bail!("no users configured for environment '{env_key}'; run `sso --setup`");
    }
    let Some(user_index) = ctx.prompter.choose("Select user", &user_keys)? else {
        return Ok(());
    };
    let user_key = user_keys
        .get(user_index)
        .cloned()
        .ok_or_else(|| anyhow!("menu returned an out-of-range choice"))?;

    eprintln!("Authenticating as {user_key} on {env_key}...");
    let token = ctx.acquirer().acquire(&mut config, &env_key, &user_key).await?;
    let username = decode_unverified(&token.access_token)
        .preferred_username()
        .map(str::to_string);

    let response = TokenResponse {
        environment: env_key,
        user: user_key,
        access_token: token.access_token,
    };
    let system_clipboard = match flags.format {
        OutputFormat::Text => SystemClipboard::for_terminal(),
        OutputFormat::Json => None,
    };
    let clipboard = system_clipboard.as_ref().map(|c| c as &dyn Clipboard);
    if deliver(&response, clipboard, flags.format)? == Delivery::Copied {
        eprintln!("Token copied to clipboard");
    }
    if let Some(username) = username {
        eprintln!("User: {username}");
    }
    Ok(())
}

fn deliver(
    response: &TokenResponse,
    clipboard: Option<&dyn Clipboard>,
    format: OutputFormat,
) -> anyhow::Result<Delivery> {
    if let Some(clipboard) = clipboard {
        match clipboard.set_text(&response.access_token) {
            Ok(()) => return Ok(Delivery::Copied),
            Err(error) => tracing::warn!(%error, "clipboard unavailable; printing the token"),
        }
    }
    output(response, format)?;
    Ok(Delivery::Printed)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::anyhow;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct RecordingClipboard {
        copied: Mutex<Vec<String>>,
        broken: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn set_text(&self, text: &str) -> anyhow::Result<()> {
            if self.broken {
                return Err(anyhow!("no display"));
            }
            self.copied.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn response() -> TokenResponse {
        TokenResponse {
            environment: "dev".into(),
            user: "alice".into(),
            access_token: "tok-abc".into(),
        }
    }

    #[test]
    fn token_is_copied_when_clipboard_works() {
        let clipboard = RecordingClipboard::default();

        let delivery =
            deliver(&response(), Some(&clipboard), OutputFormat::Text).expect("delivered");

        assert_eq!(delivery, Delivery::Copied);
        assert_eq!(*clipboard.copied.lock().unwrap(), vec!["tok-abc".to_string()]);
    }

    #[test]
    fn broken_clipboard_falls_back_to_printing() {
        let clipboard = RecordingClipboard {
            broken: true,
            ..RecordingClipboard::default()
        };

        let delivery =
            deliver(&response(), Some(&clipboard), OutputFormat::Text).expect("delivered");

        assert_eq!(delivery, Delivery::Printed);
    }

    #[test]
    fn without_clipboard_the_token_is_printed() {
        assert_eq!(
            deliver(&response(), None, OutputFormat::Json).expect("delivered"),
            Delivery::Printed
        );
    }
}
