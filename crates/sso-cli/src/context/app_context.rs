use anyhow::Context;
use sso_auth::{ClaimsInspector, KeyringSecretStore, TokenAcquirer};
use sso_config::{ConfigStore, FileConfigStore, Settings, SsoConfig};

use crate::ui::TerminalPrompter;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub settings: Settings,
    pub config_store: FileConfigStore,
    pub secrets: KeyringSecretStore,
    pub prompter: TerminalPrompter,
    pub http: reqwest::Client,
}

impl AppContext {
    pub fn init(settings: Settings) -> anyhow::Result<Self> {
        let config_path = settings
            .config_file_path()
            .context("cannot locate the sso config file")?;
        if let Some(legacy) = Settings::stranded_legacy_config(&config_path) {
            tracing::warn!(
                legacy = %legacy.display(),
                config = %config_path.display(),
                "YAML config from an earlier release is not read; run `sso --setup`"
            );
        }
        let http = sso_auth::http_client(settings.http_timeout())
            .context("failed to build HTTP client")?;

        Ok(Self {
            config_store: FileConfigStore::new(config_path),
            secrets: KeyringSecretStore::new(settings.keyring_service.clone()),
            prompter: TerminalPrompter::detect(),
            http,
            settings,
        })
    }

    /// Load the config document; a missing file is an error here.
    pub fn load_config(&self) -> anyhow::Result<SsoConfig> {
        Ok(self.config_store.load()?)
    }

    pub fn save_config(&self, config: &SsoConfig) -> anyhow::Result<()> {
        self.config_store.save(config)?;
        tracing::info!(path = %self.config_store.path().display(), "config saved");
        Ok(())
    }

    pub fn acquirer(&self) -> TokenAcquirer<'_> {
        TokenAcquirer::new(self.http.clone(), &self.secrets, &self.prompter, &self.config_store)
            .with_fallback_client_id(self.settings.password_client_id.clone())
    }

    pub fn inspector(&self) -> ClaimsInspector {
        ClaimsInspector::new(self.http.clone())
    }

    pub const fn is_interactive(&self) -> bool {
        self.prompter.is_interactive()
    }
}
