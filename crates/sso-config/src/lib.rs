//! # sso-config
//!
//! Configuration for the sso credential broker.
//!
//! Two separate concerns live here:
//! - [`Settings`]: runtime knobs layered with figment (defaults, then `SSO_*` env vars)
//! - [`SsoConfig`]: the environment/identity document, persisted as TOML through a
//!   [`ConfigStore`]. It holds issuer URLs and user identifiers, never secrets.
//!
//! # Usage
//!
//! ```no_run
//! use sso_config::{ConfigStore, FileConfigStore, Settings};
//!
//! let settings = Settings::load().expect("settings");
//! let store = FileConfigStore::new(settings.config_file_path().expect("path"));
//! let config = store.load().expect("config");
//!
//! for environment in config.environments() {
//!     println!("{} -> {}", environment.key, environment.issuer_url);
//! }
//! ```

mod document;
mod error;
mod settings;
mod store;

pub use document::SsoConfig;
pub use error::ConfigError;
pub use settings::{DEFAULT_KEYRING_SERVICE, DEFAULT_PASSWORD_CLIENT_ID, Settings};
pub use store::{ConfigStore, FileConfigStore};
