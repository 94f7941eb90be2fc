//! Integration tests for `SSO_*` environment overrides.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use std::path::PathBuf;
use std::time::Duration;

use figment::Jail;
use sso_config::{ConfigStore, FileConfigStore, Settings};

#[test]
fn defaults_apply_without_env() {
    Jail::expect_with(|_jail| {
        let settings = Settings::load().expect("settings load");
        assert_eq!(settings.keyring_service, "sso-cli");
        assert_eq!(settings.password_client_id, "admin-cli");
        assert_eq!(settings.http_timeout_secs, 30);
        assert!(settings.config_path.is_none());
        Ok(())
    });
}

#[test]
fn config_path_env_overrides_location() {
    Jail::expect_with(|jail| {
        jail.set_env("SSO_CONFIG_PATH", "/tmp/custom/sso.toml");
        let settings = Settings::load().expect("settings load");
        assert_eq!(
            settings.config_file_path().expect("path"),
            PathBuf::from("/tmp/custom/sso.toml")
        );
        Ok(())
    });
}

#[test]
fn runtime_knobs_come_from_env() {
    Jail::expect_with(|jail| {
        jail.set_env("SSO_KEYRING_SERVICE", "sso-cli-test");
        jail.set_env("SSO_PASSWORD_CLIENT_ID", "frontend");
        jail.set_env("SSO_HTTP_TIMEOUT_SECS", "5");
        // Unrelated SSO_* variables must not break extraction.
        jail.set_env("SSO_LOG", "debug");

        let settings = Settings::load().expect("settings load");
        assert_eq!(settings.keyring_service, "sso-cli-test");
        assert_eq!(settings.password_client_id, "frontend");
        assert_eq!(settings.http_timeout(), Duration::from_secs(5));
        Ok(())
    });
}

#[test]
fn non_numeric_timeout_is_an_error() {
    Jail::expect_with(|jail| {
        jail.set_env("SSO_HTTP_TIMEOUT_SECS", "soon");
        assert!(Settings::load().is_err());
        Ok(())
    });
}

#[test]
fn document_written_by_env_path_is_loadable() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "sso.toml",
            r#"
[environments.local]
name = "Local"
sso_url = "http://localhost:8080/realms/master"

[environments.local.users.admin]
auth_type = "user"
email = "admin@localhost"
"#,
        )?;
        jail.set_env("SSO_CONFIG_PATH", "sso.toml");

        let settings = Settings::load().expect("settings load");
        let store = FileConfigStore::new(settings.config_file_path().expect("path"));
        let config = store.load().expect("document loads");

        let (environment, user) = config.identity("local", "admin").expect("identity");
        assert_eq!(environment.name, "Local");
        assert_eq!(user.email(), Some("admin@localhost"));
        Ok(())
    });
}
