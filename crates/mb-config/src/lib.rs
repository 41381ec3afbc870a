//! # mb-config
//!
//! Layered configuration loading for mentorbase using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`MENTORBASE_*` prefix, `__` as separator)
//! 2. Project-level `./mentorbase.toml`
//! 3. User-level `~/.config/mentorbase/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `MENTORBASE_DATABASE__PATH` -> `database.path`,
//! `MENTORBASE_NOTIFICATION__API_KEY` -> `notification.api_key`, etc.
//!
//! ```no_run
//! use mb_config::MentorbaseConfig;
//!
//! let config = MentorbaseConfig::load_with_dotenv().expect("config");
//! if config.notification.is_configured() {
//!     println!("Notifications go to {}", config.notification.base_url);
//! }
//! ```

mod database;
mod error;
mod general;
mod notification;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use notification::NotificationConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = "mentorbase.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MentorbaseConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl MentorbaseConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does not read `.env`; use [`Self::load_with_dotenv`] for that.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration with an explicit TOML file in place of
    /// `./mentorbase.toml`. Environment variables still win.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the file does not exist, or
    /// `ConfigError::Figment` if it fails to parse.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::InvalidValue {
                field: "config".into(),
                reason: format!("{} does not exist", path.display()),
            });
        }
        Self::layered(Some(path.to_path_buf()))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        Self::layered(local.exists().then_some(local))
    }

    fn layered(local: Option<PathBuf>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        if let Some(local_path) = local {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("MENTORBASE_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mentorbase").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = MentorbaseConfig::default();
        assert!(!config.notification.is_configured());
        assert_eq!(config.database.path, "mentorbase.db");
        assert_eq!(config.general.default_page_size, 20);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = MentorbaseConfig::load_from(Path::new("/nonexistent/mentorbase.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
