//! Lifecycle operations.
//!
//! Creating and opening a store, and store-wide maintenance.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{debug, info};

use super::Vault;
use crate::core::access::require_team_manager;
use crate::core::constants::TEAM_FILE;
use crate::core::domain::{Role, Team, User};
use crate::core::identity::Identity;
use crate::core::reencrypt::{Reencryptor, Scope, Stats};
use crate::core::store::Store;
use crate::error::{Result, StoreError};

impl<S: Store> Vault<S> {
    /// Initialize a new store with the operator as its first admin.
    ///
    /// The operator's key is trusted as-is: nobody else exists yet who
    /// could verify it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the store already has a team.
    pub fn init(
        store: S,
        identity: Identity,
        operator: &str,
        display_name: &str,
        state_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let vault = Self::new(store, identity, operator, state_dir)?;
        if vault.store.exists(TEAM_FILE) {
            return Err(StoreError::AlreadyExists(TEAM_FILE.to_string()).into());
        }

        let admin = User::new(&vault.operator, display_name, BTreeSet::from([Role::Admin]))
            .with_key(&vault.public_key(), false);
        let team = Team::new().with_member(admin)?;
        vault.save_team(&team)?;

        info!(operator = %vault.operator, "initialized store");
        Ok(vault)
    }

    /// Open an existing store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotInitialized` if the store has no team file.
    pub fn open(
        store: S,
        identity: Identity,
        operator: &str,
        state_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let vault = Self::new(store, identity, operator, state_dir)?;
        vault.team()?;
        Ok(vault)
    }

    /// Re-encrypt secrets for the current team.
    ///
    /// Run after role changes or a merge of the team file. Per-file
    /// failures are reported in the returned [`Stats`].
    pub fn reencrypt(&self, scope: &Scope) -> Result<Stats> {
        let team = self.team()?;
        require_team_manager(&self.operator_in(&team)?)?;

        debug!(?scope, "re-encrypting store");
        Reencryptor::new(&self.store, &self.cipher, &team).run(scope)
    }

    /// Drop expired verification challenges from local state.
    pub fn cleanup_expired(&self) -> Result<usize> {
        self.verifier.cleanup_expired()
    }
}
