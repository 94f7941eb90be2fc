use anyhow::Context;
use sso_config::Settings;

/// Load `.env` from the working directory, if there is one.
pub fn load_dotenv() {
    if let Err(error) = dotenvy::dotenv()
        && !error.not_found()
    {
        // The subscriber is not up yet.
        eprintln!("sso warning: ignoring unreadable .env file: {error}");
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = Settings::load().context("failed to read SSO_* settings")?;
    tracing::debug!(
        config_path = ?settings.config_path,
        keyring_service = %settings.keyring_service,
        timeout_secs = settings.http_timeout_secs,
        "settings loaded"
    );
    Ok(settings)
}
