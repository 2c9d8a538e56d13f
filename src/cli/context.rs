//! Per-invocation state shared by commands: config, overrides, and how to
//! obtain a passphrase.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use dialoguer::Password;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::config::Config;
use crate::core::identity::{self, Identity};
use crate::core::store::Filesystem;
use crate::core::vault::Vault;
use crate::error::{KeyError, Result};

pub struct Context {
    pub config: Config,
    store: Option<PathBuf>,
    passphrase: Option<Zeroizing<String>>,
}

impl Context {
    pub fn load(store: Option<PathBuf>, passphrase: Option<String>) -> Result<Self> {
        Ok(Self {
            config: Config::load()?,
            store,
            passphrase: passphrase.map(Zeroizing::new),
        })
    }

    /// `--store` wins over the config file.
    pub fn store_dir(&self) -> Result<PathBuf> {
        match &self.store {
            Some(path) => Ok(path.clone()),
            None => self.config.store_dir(),
        }
    }

    /// The `--store` override, if one was given.
    pub fn store_override(&self) -> Option<&Path> {
        self.store.as_deref()
    }

    pub fn identity_path(&self) -> Result<PathBuf> {
        self.config.identity_path()
    }

    /// Load the private key, asking for a passphrase only if it is
    /// protected.
    pub fn load_identity(&self) -> Result<Identity> {
        let path = self.identity_path()?;
        if !path.exists() {
            return Err(KeyError::NoPrivateKey(path.display().to_string()).into());
        }

        if identity::is_protected(&path)? {
            let passphrase = self.passphrase("Passphrase")?;
            Identity::load(&path, Some(&passphrase))
        } else {
            Identity::load(&path, None)
        }
    }

    /// The passphrase from `--passphrase`/`LOCKBOX_PASSPHRASE`, or a
    /// hidden prompt when attached to a terminal.
    pub fn passphrase(&self, prompt: &str) -> Result<Zeroizing<String>> {
        if let Some(passphrase) = &self.passphrase {
            return Ok(passphrase.clone());
        }
        if !io::stdin().is_terminal() {
            return Err(KeyError::PassphraseRequired.into());
        }
        Ok(Zeroizing::new(Password::new().with_prompt(prompt).interact()?))
    }

    /// A passphrase for a key that has none yet: the supplied one, or one
    /// typed twice.
    pub fn new_passphrase(&self) -> Result<Zeroizing<String>> {
        match &self.passphrase {
            Some(passphrase) => Ok(passphrase.clone()),
            None => self.prompt_new_passphrase(),
        }
    }

    /// A replacement passphrase, always typed twice: the supplied one is
    /// the current passphrase.
    pub fn prompt_new_passphrase(&self) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(KeyError::PassphraseRequired.into());
        }
        let passphrase = Password::new()
            .with_prompt("New passphrase")
            .with_confirmation("Confirm passphrase", "passphrases do not match")
            .interact()?;
        Ok(Zeroizing::new(passphrase))
    }

    /// Open the configured store as the configured operator.
    pub fn open_vault(&self) -> Result<Vault> {
        let store = self.store_dir()?;
        debug!(store = %store.display(), "opening store");

        let identity = self.load_identity()?;
        let email = self.config.require_email()?;
        Vault::open(
            Filesystem::new(store),
            identity,
            &email,
            self.config.state_dir()?,
        )
    }
}
