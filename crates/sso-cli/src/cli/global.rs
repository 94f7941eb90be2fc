use clap::ValueEnum;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text; a bare token when fetching one.
    #[default]
    Text,
    Json,
}

/// What `--list` enumerates.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ListTarget {
    #[value(alias = "envs", alias = "environment", alias = "environments")]
    Env,
    #[value(alias = "users")]
    User,
}

/// Flags every command handler may consult.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
}
