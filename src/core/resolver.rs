//! Recipient resolution.
//!
//! Decides which public keys a secret is encrypted for:
//!
//! 1. An explicit, active [`SecretPermissions`] list is authoritative:
//!    every entry (read or write) is a recipient, team roles are ignored.
//! 2. Otherwise a credential goes to every roster member, and an env file
//!    to the roster members holding a role that may access its stage.
//! 3. The resolving operator is always added.
//!
//! An empty result is an error, never an encryption for nobody.

use tracing::trace;

use crate::core::cipher::dedup_keys;
use crate::core::domain::{Role, Secret, SecretPermissions, SecretRef, Stage, Team};
use crate::core::types::PublicKey;
use crate::error::{CipherError, Result};

/// Which roles may read env files of which stage.
pub trait StagePolicy {
    fn allows(&self, role: Role, stage: Stage) -> bool;
}

/// The built-in role hierarchy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl StagePolicy for RolePolicy {
    fn allows(&self, role: Role, stage: Stage) -> bool {
        role.can_access(stage)
    }
}

/// Resolves recipients against one team snapshot.
///
/// The snapshot is taken at construction; reload the team and build a new
/// resolver to observe later changes.
pub struct Resolver<'a, P: StagePolicy = RolePolicy> {
    team: &'a Team,
    operator_key: PublicKey,
    policy: P,
}

impl<'a> Resolver<'a, RolePolicy> {
    pub fn new(team: &'a Team, operator_key: &str) -> Self {
        Self::with_policy(team, operator_key, RolePolicy)
    }
}

impl<'a, P: StagePolicy> Resolver<'a, P> {
    pub fn with_policy(team: &'a Team, operator_key: &str, policy: P) -> Self {
        Self {
            team,
            operator_key: operator_key.to_string(),
            policy,
        }
    }

    pub fn resolve(&self, secret: &Secret) -> Result<Vec<PublicKey>> {
        self.resolve_ref(&secret.reference(), secret.permissions())
    }

    /// Resolve from a secret's address and permissions alone.
    pub fn resolve_ref(
        &self,
        reference: &SecretRef,
        permissions: Option<&SecretPermissions>,
    ) -> Result<Vec<PublicKey>> {
        let mut keys = match permissions.filter(|p| p.is_explicit()) {
            Some(permissions) => permissions.read_keys(),
            None => self.role_based(reference),
        };
        keys.push(self.operator_key.clone());

        let keys = dedup_keys(&keys);
        trace!(secret = %reference, recipients = keys.len(), "resolved recipients");

        if keys.is_empty() {
            return Err(CipherError::NoRecipients.into());
        }
        Ok(keys)
    }

    fn role_based(&self, reference: &SecretRef) -> Vec<PublicKey> {
        self.team
            .eligible()
            .filter(|user| match reference.stage() {
                None => true,
                Some(stage) => user.roles.iter().any(|r| self.policy.allows(*r, stage)),
            })
            .filter_map(|user| user.roster_key().map(str::to_string))
            .collect()
    }
}
