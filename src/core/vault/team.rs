//! Team operations.
//!
//! Manage who is on the team, with which roles and under which key. Only
//! a verified key ever reaches the roster.

use std::collections::BTreeSet;

use tracing::info;

use super::Vault;
use crate::core::access::require_team_manager;
use crate::core::domain::{PendingVerification, Role, User};
use crate::core::reencrypt::{Reencryptor, Scope, Stats};
use crate::core::store::Store;
use crate::core::types::PublicKey;
use crate::core::validation::{normalize_email, validate_public_key};
use crate::error::{AccessError, Error, Result, TeamError, ValidationError, VerifyError};

/// Where an invited member's key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// No key yet. The member receives nothing until one is added.
    Missing,
    /// A key the operator already trusts, e.g. exchanged in person.
    Trusted(PublicKey),
    /// A claimed key that must pass a challenge before it is trusted.
    Unverified(PublicKey),
}

impl KeySource {
    pub fn public_key(&self) -> Option<&str> {
        match self {
            KeySource::Missing => None,
            KeySource::Trusted(key) | KeySource::Unverified(key) => Some(key.as_str()),
        }
    }
}

/// Outcome of [`Vault::invite`].
#[derive(Debug)]
pub struct Invitation {
    pub user: User,
    /// Set for an unverified key: send `encrypted_challenge` to the member.
    pub challenge: Option<PendingVerification>,
}

/// A member whose key still awaits verification.
#[derive(Debug)]
pub struct PendingMember {
    pub user: User,
    /// The live challenge, if one was issued from this machine.
    pub challenge: Option<PendingVerification>,
    /// A challenge existed but ran out; reissue it.
    pub expired: bool,
}

impl<S: Store> Vault<S> {
    /// Add a member, or merge `roles` into an existing one.
    ///
    /// # Errors
    ///
    /// * `ValidationError` for a bad email, key, or an empty role set
    /// * `AccessError::Denied` unless the operator manages the team
    /// * `TeamError::MemberExists` if the key belongs to another member
    pub fn invite(
        &self,
        email: &str,
        display_name: &str,
        roles: BTreeSet<Role>,
        key: KeySource,
    ) -> Result<Invitation> {
        let email = normalize_email(email)?;
        if roles.is_empty() {
            return Err(ValidationError::EmptyField("roles").into());
        }
        if let Some(public_key) = key.public_key() {
            validate_public_key(public_key)?;
        }

        let team = self.team()?;
        require_team_manager(&self.operator_in(&team)?)?;

        if let Some(owner) = key.public_key().and_then(|k| team.get_by_key(k)) {
            if !owner.matches_email(&email) {
                return Err(TeamError::MemberExists(owner.email.clone()).into());
            }
        }

        let existing = team.get(&email).cloned();
        let base = match &existing {
            Some(user) => user.with_roles(user.roles.union(&roles).copied().collect()),
            None => User::new(&email, display_name, roles),
        };

        let (user, challenge) = match &key {
            KeySource::Missing => (base, None),
            KeySource::Trusted(public_key) => {
                self.verifier.cancel(&email)?;
                (base.with_key(public_key, false), None)
            }
            KeySource::Unverified(public_key) => {
                let pending = self.verifier.issue(&email, public_key)?;
                (base.with_key(public_key, true), Some(pending))
            }
        };

        let team = match existing {
            Some(_) => team.with_updated(user.clone())?,
            None => team.with_member(user.clone())?,
        };
        self.save_team(&team)?;

        info!(
            email = %user.email,
            pending = user.verification_pending,
            "invited member"
        );
        Ok(Invitation { user, challenge })
    }

    /// Issue a fresh challenge for a pending member, replacing any
    /// earlier one.
    pub fn reissue_challenge(&self, email: &str) -> Result<PendingVerification> {
        let email = normalize_email(email)?;
        let team = self.team()?;
        require_team_manager(&self.operator_in(&team)?)?;

        let user = team.require(&email)?;
        if !user.verification_pending {
            return Err(TeamError::NotPending(email).into());
        }
        let public_key = user
            .public_key
            .as_deref()
            .ok_or_else(|| TeamError::NoPublicKey(email.clone()))?;
        self.verifier.issue(&email, public_key)
    }

    /// Check a member's challenge response and, on success, trust their
    /// key.
    ///
    /// # Errors
    ///
    /// * `VerifyError::ChallengeNotFound` if the member is not pending
    /// * `VerifyError::ChallengeExpired` if the challenge ran out
    /// * `VerifyError::ChallengeMismatch` if the response is wrong
    pub fn verify_member(&self, email: &str, response: &str) -> Result<User> {
        let email = normalize_email(email)?;
        let team = self.team()?;
        require_team_manager(&self.operator_in(&team)?)?;

        let user = team
            .get(&email)
            .filter(|u| u.verification_pending)
            .cloned()
            .ok_or_else(|| VerifyError::ChallengeNotFound(email.clone()))?;

        let verified_key = self.verifier.verify(&email, response)?;
        if user.public_key.as_deref() != Some(verified_key.as_str()) {
            // The team file names a different key than the one challenged.
            return Err(VerifyError::ChallengeMismatch(email).into());
        }

        let user = user.verified();
        self.save_team(&team.with_updated(user.clone())?)?;

        info!(email = %user.email, "verified member key");
        Ok(user)
    }

    pub fn pending_members(&self) -> Result<Vec<PendingMember>> {
        let team = self.team()?;
        require_team_manager(&self.operator_in(&team)?)?;

        team.pending()
            .map(|user| {
                let (challenge, expired) = match self.verifier.pending(&user.email) {
                    Ok(pending) => (Some(pending), false),
                    Err(Error::Verify(VerifyError::ChallengeExpired(_))) => (None, true),
                    Err(Error::Verify(VerifyError::ChallengeNotFound(_))) => (None, false),
                    Err(e) => return Err(e),
                };
                Ok(PendingMember {
                    user: user.clone(),
                    challenge,
                    expired,
                })
            })
            .collect()
    }

    /// Remove a member.
    ///
    /// With `reencrypt`, every secret is re-encrypted for the remaining
    /// team and the member's key is stripped from explicit permissions.
    /// Without it, the member can still open everything already written.
    pub fn revoke_member(&self, email: &str, reencrypt: bool) -> Result<Option<Stats>> {
        let email = normalize_email(email)?;
        let team = self.team()?;
        let operator = self.operator_in(&team)?;
        require_team_manager(&operator)?;
        if operator.matches_email(&email) {
            return Err(AccessError::SelfRevocation.into());
        }

        let (team, removed) = team.without_member(&email)?;
        self.save_team(&team)?;
        self.verifier.cancel(&email)?;
        info!(email = %email, "revoked member");

        if !reencrypt {
            return Ok(None);
        }
        let stats = Reencryptor::new(&self.store, &self.cipher, &team)
            .prune_keys(removed.public_key)
            .run(&Scope::All)?;
        Ok(Some(stats))
    }

    /// Add a role. Granting a role already held is a no-op.
    pub fn grant_role(&self, email: &str, role: Role) -> Result<User> {
        let email = normalize_email(email)?;
        let team = self.team()?;
        require_team_manager(&self.operator_in(&team)?)?;

        let user = team.require(&email)?;
        let mut roles = user.roles.clone();
        roles.insert(role);
        let user = user.with_roles(roles);

        self.save_team(&team.with_updated(user.clone())?)?;
        Ok(user)
    }

    /// Remove a role.
    ///
    /// # Errors
    ///
    /// * `TeamError::LastRole` if it is the member's only role
    /// * `TeamError::SelfDemotion` if the operator drops their own admin role
    pub fn ungrant_role(&self, email: &str, role: Role) -> Result<User> {
        let email = normalize_email(email)?;
        let team = self.team()?;
        let operator = self.operator_in(&team)?;
        require_team_manager(&operator)?;
        if role == Role::Admin && operator.matches_email(&email) {
            return Err(TeamError::SelfDemotion.into());
        }

        let user = team.require(&email)?;
        let mut roles = user.roles.clone();
        roles.remove(&role);
        if roles.is_empty() {
            return Err(TeamError::LastRole { email }.into());
        }
        let user = user.with_roles(roles);

        self.save_team(&team.with_updated(user.clone())?)?;
        Ok(user)
    }

    /// Every member, in team order.
    pub fn members(&self) -> Result<Vec<User>> {
        let team = self.team()?;
        self.operator_in(&team)?;
        Ok(team.members().to_vec())
    }
}
