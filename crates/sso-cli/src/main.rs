use clap::Parser;

mod bootstrap;
mod cli;
mod clipboard;
mod commands;
mod context;
mod output;
mod ui;

#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("sso error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    bootstrap::load_dotenv();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let action = cli.action()?;

    let settings = bootstrap::load_settings()?;
    let ctx = context::AppContext::init(settings)?;

    commands::dispatch::dispatch(action, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SSO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout is reserved for the token.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
