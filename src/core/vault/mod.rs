//! The primary interface for lockbox operations.
//!
//! Vault wires the secret store, the local identity and the team file
//! together. Every operation reloads the team, so each one runs against a
//! fresh snapshot and authorizes the operator before touching any secret.

mod access;
mod lifecycle;
mod secrets;
mod team;

pub use team::{Invitation, KeySource, PendingMember};

use std::path::PathBuf;

use tracing::debug;

use crate::core::cipher::{Age, Cipher};
use crate::core::constants::{RECIPIENTS_FILE, TEAM_FILE};
use crate::core::domain::{Roster, Team, User};
use crate::core::identity::Identity;
use crate::core::store::{Filesystem, Store};
use crate::core::types::{Email, PublicKey};
use crate::core::validation::normalize_email;
use crate::core::verification::Verifier;
use crate::error::{AccessError, Error, Result, StoreError};

/// Operations on one secret store, performed as one operator.
///
/// Pending verification challenges are kept in a machine-local state
/// directory, never in the shared store: the plaintext challenge must not
/// be readable by the claimant.
pub struct Vault<S: Store = Filesystem> {
    store: S,
    cipher: Age,
    operator: Email,
    verifier: Verifier<Filesystem>,
}

impl<S: Store> std::fmt::Debug for Vault<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("operator", &self.operator)
            .field("identity", self.cipher.identity())
            .finish()
    }
}

impl<S: Store> Vault<S> {
    /// Bind a store, an identity and an operator email.
    ///
    /// Nothing is read yet; see [`Vault::open`] for a checked constructor.
    pub fn new(
        store: S,
        identity: Identity,
        operator: &str,
        state_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            store,
            cipher: Age::new(identity),
            operator: normalize_email(operator)?,
            verifier: Verifier::new(Filesystem::new(state_dir)),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cipher(&self) -> &Age {
        &self.cipher
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn public_key(&self) -> PublicKey {
        self.cipher.public_key()
    }

    /// Load the current team.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotInitialized` if the store has no team file.
    pub fn team(&self) -> Result<Team> {
        let bytes = match self.store.get(TEAM_FILE) {
            Ok(bytes) => bytes,
            Err(Error::Store(StoreError::NotFound(_))) => {
                return Err(StoreError::NotInitialized(TEAM_FILE.to_string()).into())
            }
            Err(e) => return Err(e),
        };
        let text = String::from_utf8(bytes).map_err(|e| StoreError::Malformed {
            file: TEAM_FILE,
            reason: e.to_string(),
        })?;
        Team::parse(&text)
    }

    /// Load the recipients roster as written in the store.
    pub fn roster(&self) -> Result<Roster> {
        match self.store.get(RECIPIENTS_FILE) {
            Ok(bytes) => Ok(Roster::parse(&String::from_utf8_lossy(&bytes))),
            Err(Error::Store(StoreError::NotFound(_))) => Ok(Roster::new()),
            Err(e) => Err(e),
        }
    }

    /// Write the team file and regenerate the roster from it.
    fn save_team(&self, team: &Team) -> Result<()> {
        let roster = team.roster();
        debug!(
            members = team.members().len(),
            roster = roster.len(),
            "saving team"
        );
        self.store.set(TEAM_FILE, team.render()?.as_bytes())?;
        self.store.set(RECIPIENTS_FILE, roster.render().as_bytes())
    }

    /// The operator's team record.
    ///
    /// The record must hold this vault's key and be verified. Someone
    /// outside the team, a member still pending verification, and a key
    /// claiming another member's email are all denied.
    fn operator_in(&self, team: &Team) -> Result<User> {
        let user = team.get(&self.operator).ok_or(AccessError::Denied)?;
        let public_key = self.public_key();
        if user.roster_key() != Some(public_key.as_str()) {
            debug!(
                operator = %self.operator,
                pending = user.verification_pending,
                "operator key does not match a verified team record"
            );
            return Err(AccessError::Denied.into());
        }
        Ok(user.clone())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeSet;

    use tempfile::TempDir;

    use super::*;
    use crate::core::domain::Role;

    /// A store with Alice as admin, plus helpers to act as other members.
    pub struct Fixture {
        pub tmp: TempDir,
        pub alice: Vault,
    }

    impl Fixture {
        pub fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let alice = Vault::init(
                Filesystem::new(tmp.path().join("store")),
                Identity::ephemeral(),
                "alice@x.io",
                "Alice",
                tmp.path().join("alice-state"),
            )
            .unwrap();
            Self { tmp, alice }
        }

        /// A trusted member acting through their own vault handle.
        pub fn member(&self, email: &str, roles: &[Role]) -> Vault {
            let identity = Identity::ephemeral();
            self.alice
                .invite(
                    email,
                    "",
                    roles.iter().copied().collect::<BTreeSet<_>>(),
                    KeySource::Trusted(identity.public_key()),
                )
                .unwrap();
            self.as_member(email, identity)
        }

        pub fn as_member(&self, email: &str, identity: Identity) -> Vault {
            Vault::new(
                Filesystem::new(self.tmp.path().join("store")),
                identity,
                email,
                self.tmp.path().join(format!("{}-state", email)),
            )
            .unwrap()
        }
    }
}
