//! Configuration file management.
//!
//! Handles reading and writing the per-user `config.toml`. Every field is
//! optional on disk; the accessors fill in platform defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::core::validation::normalize_email;
use crate::error::{ConfigError, Result};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "LOCKBOX_CONFIG";

/// Per-user configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the versioned secret tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,
    /// Private key file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<PathBuf>,
    /// Operator email, as recorded in the team file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Machine-local state that must never be committed (pending challenges).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PathBuf>,
}

impl Config {
    /// Location of the config file: `$LOCKBOX_CONFIG`, or
    /// `<config_dir>/lockbox/config.toml`.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        Ok(config_dir()?.join(constants::CONFIG_FILE))
    }

    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");

        let contents = toml::to_string(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Store root, defaulting to `~/.lockbox`.
    pub fn store_dir(&self) -> Result<PathBuf> {
        match &self.store {
            Some(path) => Ok(path.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(constants::STORE_DIR))
                .ok_or_else(|| ConfigError::NoDirectory("home").into()),
        }
    }

    /// Private key path, defaulting to `<config_dir>/lockbox/identity`.
    pub fn identity_path(&self) -> Result<PathBuf> {
        match &self.identity {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join(constants::IDENTITY_FILE)),
        }
    }

    /// Local state directory, defaulting to `<data_local_dir>/lockbox`.
    pub fn state_dir(&self) -> Result<PathBuf> {
        match &self.state {
            Some(path) => Ok(path.clone()),
            None => dirs::data_local_dir()
                .map(|dir| dir.join(constants::CONFIG_DIR))
                .ok_or_else(|| ConfigError::NoDirectory("data").into()),
        }
    }

    /// The configured operator email, normalized.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if no email is set.
    pub fn require_email(&self) -> Result<String> {
        match self.email.as_deref() {
            Some(email) if !email.trim().is_empty() => normalize_email(email),
            _ => Err(ConfigError::MissingField { field: "email" }.into()),
        }
    }
}

fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(constants::CONFIG_DIR))
        .ok_or_else(|| ConfigError::NoDirectory("config").into())
}
