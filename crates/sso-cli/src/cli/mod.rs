use anyhow::bail;
use clap::{ArgGroup, Parser};

pub mod global;

pub use global::{GlobalFlags, ListTarget, OutputFormat};

/// Top-level CLI parser for the `sso` binary.
#[derive(Debug, Parser)]
#[command(
    name = "sso",
    version,
    about = "Fetch access tokens for Keycloak identities whose secrets live in the OS keychain",
    after_help = "Examples:\n  sso dev admin          print a token\n  sso dev admin --roles  list roles from the token and the provider\n  sso                    pick interactively\n  sso --setup            add or edit environments and users\n  sso --reset            back up the config and start over"
)]
#[command(group(ArgGroup::new("mode").args(["list", "remove", "setup", "reset"])))]
pub struct Cli {
    /// Environment key, email local part, or unique prefix
    pub environment: Option<String>,

    /// User key, email local part, client id, or unique prefix
    pub user: Option<String>,

    /// List roles from the token and from the provider instead of printing the token
    #[arg(short, long, conflicts_with = "mode")]
    pub roles: bool,

    /// List environments, or users (optionally of one environment)
    #[arg(long, value_name = "env|user")]
    pub list: Option<ListTarget>,

    /// Remove `env <id>` or `user <env> <id>`, including stored secrets
    #[arg(
        long,
        num_args = 2..=3,
        value_names = ["KIND", "ENV", "ID"],
        conflicts_with_all = ["environment", "user"]
    )]
    pub remove: Option<Vec<String>>,

    /// Add or edit environments and users in the existing config
    #[arg(long, conflicts_with_all = ["environment", "user"])]
    pub setup: bool,

    /// Back up the config, then run setup from scratch
    #[arg(long, conflicts_with_all = ["environment", "user"])]
    pub reset: bool,

    /// Output format: text, json
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,
}

/// What one invocation does, after argument validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Token { environment: String, user: String },
    Roles { environment: String, user: String },
    List { target: ListTarget, environment: Option<String> },
    Remove(RemoveTarget),
    Setup,
    Reset,
    Interactive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoveTarget {
    Environment(String),
    User { environment: String, user: String },
}

impl RemoveTarget {
    fn parse(values: &[String]) -> anyhow::Result<Self> {
        match values {
            [kind, id] if is_env_kind(kind) => Ok(Self::Environment(id.clone())),
            [kind, environment, user] if kind == "user" => Ok(Self::User {
                environment: environment.clone(),
                user: user.clone(),
            }),
            _ => bail!("usage: --remove env <id> | --remove user <env> <id>"),
        }
    }
}

fn is_env_kind(kind: &str) -> bool {
    matches!(kind, "env" | "environment")
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }

    /// Map the parsed flags onto a single action.
    pub fn action(&self) -> anyhow::Result<Action> {
        if self.setup {
            return Ok(Action::Setup);
        }
        if self.reset {
            return Ok(Action::Reset);
        }
        if let Some(values) = &self.remove {
            return RemoveTarget::parse(values).map(Action::Remove);
        }
        if let Some(target) = self.list {
            if self.user.is_some() || (target == ListTarget::Env && self.environment.is_some()) {
                bail!("usage: --list env | --list user [env]");
            }
            return Ok(Action::List {
                target,
                environment: self.environment.clone(),
            });
        }

        match (&self.environment, &self.user) {
            (Some(environment), Some(user)) => {
                let (environment, user) = (environment.clone(), user.clone());
                Ok(if self.roles {
                    Action::Roles { environment, user }
                } else {
                    Action::Token { environment, user }
                })
            }
            (None, None) if self.roles => bail!("--roles needs an environment and a user"),
            (None, None) => Ok(Action::Interactive),
            _ => bail!("provide both environment and user, or neither"),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::{Action, Cli, ListTarget, OutputFormat, RemoveTarget};

    fn action(args: &[&str]) -> anyhow::Result<Action> {
        Cli::try_parse_from(args)
            .map_err(anyhow::Error::from)
            .and_then(|cli| cli.action())
    }

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn environment_and_user_fetch_a_token() {
        assert_eq!(
            action(&["sso", "dev", "admin"]).expect("parses"),
            Action::Token {
                environment: "dev".into(),
                user: "admin".into()
            }
        );
    }

    #[test]
    fn roles_flag_switches_to_role_listing() {
        assert_eq!(
            action(&["sso", "dev", "admin", "-r"]).expect("parses"),
            Action::Roles {
                environment: "dev".into(),
                user: "admin".into()
            }
        );
    }

    #[test]
    fn no_arguments_is_interactive() {
        assert_eq!(action(&["sso"]).expect("parses"), Action::Interactive);
    }

    #[test]
    fn only_one_identifier_is_rejected() {
        let err = action(&["sso", "dev"]).expect_err("needs both");
        assert!(err.to_string().contains("both environment and user"));
    }

    #[test]
    fn roles_without_identifiers_is_rejected() {
        assert!(action(&["sso", "--roles"]).is_err());
    }

    #[test]
    fn list_users_accepts_environment_filter() {
        assert_eq!(
            action(&["sso", "--list", "user", "dev"]).expect("parses"),
            Action::List {
                target: ListTarget::User,
                environment: Some("dev".into())
            }
        );
        assert_eq!(
            action(&["sso", "--list", "env"]).expect("parses"),
            Action::List {
                target: ListTarget::Env,
                environment: None
            }
        );
    }

    #[test]
    fn list_env_rejects_filter() {
        assert!(action(&["sso", "--list", "env", "dev"]).is_err());
    }

    #[test]
    fn remove_parses_both_shapes() {
        assert_eq!(
            action(&["sso", "--remove", "env", "dev"]).expect("parses"),
            Action::Remove(RemoveTarget::Environment("dev".into()))
        );
        assert_eq!(
            action(&["sso", "--remove", "user", "dev", "admin"]).expect("parses"),
            Action::Remove(RemoveTarget::User {
                environment: "dev".into(),
                user: "admin".into()
            })
        );
    }

    #[test]
    fn remove_rejects_unknown_kind() {
        assert!(action(&["sso", "--remove", "realm", "dev"]).is_err());
        assert!(action(&["sso", "--remove", "env", "dev", "extra"]).is_err());
    }

    #[test]
    fn setup_and_reset_are_mutually_exclusive() {
        assert!(Cli::try_parse_from(["sso", "--setup", "--reset"]).is_err());
        assert_eq!(action(&["sso", "--setup"]).expect("parses"), Action::Setup);
        assert_eq!(action(&["sso", "--reset"]).expect("parses"), Action::Reset);
    }

    #[test]
    fn setup_rejects_identifiers() {
        assert!(Cli::try_parse_from(["sso", "dev", "admin", "--setup"]).is_err());
    }

    #[test]
    fn format_defaults_to_text_and_accepts_json() {
        let cli = Cli::try_parse_from(["sso", "dev", "admin"]).expect("parses");
        assert_eq!(cli.format, OutputFormat::Text);

        let cli = Cli::try_parse_from(["sso", "dev", "admin", "--format", "json"]).expect("parses");
        assert_eq!(cli.global_flags().format, OutputFormat::Json);
    }

    #[test]
    fn format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["sso", "--format", "xml"]).is_err());
    }
}
