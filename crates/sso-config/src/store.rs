//! Loading and saving the configuration document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::SsoConfig;
use crate::error::ConfigError;

/// Persistence for [`SsoConfig`].
///
/// The token engine saves through this after each mutation it makes, so callers never
/// rely on an implicit save at exit.
pub trait ConfigStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `ConfigError` if the document is missing, unreadable, or invalid.
    fn load(&self) -> Result<SsoConfig, ConfigError>;

    /// # Errors
    ///
    /// Returns `ConfigError` if the document cannot be written.
    fn save(&self, config: &SsoConfig) -> Result<(), ConfigError>;
}

/// TOML file on disk, written with owner-only permissions.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the document, treating a missing file as an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn load_or_default(&self) -> Result<SsoConfig, ConfigError> {
        if self.exists() {
            self.load()
        } else {
            Ok(SsoConfig::default())
        }
    }

    /// Move the current file aside to `backup_<YYYYmmdd_HHMMSS>_<file name>` in the same
    /// directory. Returns the backup path, or `None` if there was nothing to back up.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the rename fails.
    pub fn backup(&self) -> Result<Option<PathBuf>, ConfigError> {
        if !self.exists() {
            return Ok(None);
        }

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "config.toml".into(), |name| name.to_string_lossy());
        let backup_path = self
            .path
            .with_file_name(format!("backup_{timestamp}_{file_name}"));

        fs::rename(&self.path, &backup_path).map_err(|source| ConfigError::Io {
            action: "backup",
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(backup = %backup_path.display(), "config backed up");
        Ok(Some(backup_path))
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<SsoConfig, ConfigError> {
        if !self.exists() {
            return Err(ConfigError::Missing {
                path: self.path.clone(),
            });
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            action: "read",
            path: self.path.clone(),
            source,
        })?;
        SsoConfig::from_toml_str(&contents)
    }

    fn save(&self, config: &SsoConfig) -> Result<(), ConfigError> {
        let rendered = config.to_toml_string()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                action: "mkdir",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&self.path, rendered).map_err(|source| ConfigError::Io {
            action: "write",
            path: self.path.clone(),
            source,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(
                |source| ConfigError::Io {
                    action: "chmod",
                    path: self.path.clone(),
                    source,
                },
            )?;
        }

        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sso_core::{Environment, UserIdentity};

    use super::*;

    fn sample() -> SsoConfig {
        let mut config = SsoConfig::default();
        config.insert_environment(
            Environment::new("dev", "https://sso.dev.example.com/realms/internal")
                .with_user(UserIdentity::password("admin@example.com", "admin@example.com")),
        );
        config
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileConfigStore::new(tmp.path().join("config.toml"));

        let err = store.load().expect_err("no file yet");
        assert!(matches!(err, ConfigError::Missing { .. }));
        assert!(err.to_string().contains("sso --setup"));
        assert!(store.load_or_default().expect("default").is_empty());
    }

    #[test]
    fn save_then_load_creates_parent_dirs() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileConfigStore::new(tmp.path().join("nested").join("config.toml"));

        store.save(&sample()).expect("save");
        assert_eq!(store.load().expect("load"), sample());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileConfigStore::new(tmp.path().join("config.toml"));
        store.save(&sample()).expect("save");

        let mode = fs::metadata(store.path())
            .expect("metadata")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600, "config file should be 0600");
    }

    #[test]
    fn backup_moves_file_aside() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileConfigStore::new(tmp.path().join("config.toml"));
        assert!(store.backup().expect("nothing to back up").is_none());

        store.save(&sample()).expect("save");
        let backup = store.backup().expect("backup").expect("a backup path");

        assert!(!store.exists());
        assert!(backup.is_file());
        let name = backup.file_name().and_then(|n| n.to_str()).expect("utf-8 name");
        assert!(name.starts_with("backup_"));
        assert!(name.ends_with("_config.toml"));
        assert_eq!(backup.parent(), Some(tmp.path()));
    }
}
