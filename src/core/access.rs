//! Authorization checks and per-secret access changes.
//!
//! Denials carry no detail: the caller learns "access denied" and nothing
//! about whether the target exists.

use crate::core::domain::{AccessLevel, SecretPermissions, SecretRef, Team, User};
use crate::core::types::Email;
use crate::error::{AccessError, Result, TeamError};

fn explicit(permissions: Option<&SecretPermissions>) -> Option<&SecretPermissions> {
    permissions.filter(|p| p.is_explicit())
}

/// Whether `user` is meant to decrypt the secret.
pub fn can_read(user: &User, reference: &SecretRef, permissions: Option<&SecretPermissions>) -> bool {
    match explicit(permissions) {
        Some(p) => p.can_read(&user.email),
        None => match reference.stage() {
            None => user.is_roster_eligible(),
            Some(stage) => user.is_roster_eligible() && user.can_access(stage),
        },
    }
}

/// Whether `user` may create, modify or delete the secret.
pub fn can_write(user: &User, reference: &SecretRef, permissions: Option<&SecretPermissions>) -> bool {
    match explicit(permissions) {
        Some(p) => p.can_write(&user.email),
        None => match reference.stage() {
            None => user.can_write_credentials(),
            Some(stage) => user.can_access(stage),
        },
    }
}

pub fn require_write(
    user: &User,
    reference: &SecretRef,
    permissions: Option<&SecretPermissions>,
) -> Result<()> {
    if can_write(user, reference, permissions) {
        Ok(())
    } else {
        Err(AccessError::Denied.into())
    }
}

pub fn require_team_manager(user: &User) -> Result<()> {
    if user.can_manage_team() {
        Ok(())
    } else {
        Err(AccessError::Denied.into())
    }
}

/// Give `target` explicit access to a secret.
///
/// The first grant switches the secret from role-based to explicit
/// access. The operator is kept (or added) with write access so they
/// cannot lock themselves out.
pub fn grant(
    permissions: Option<&SecretPermissions>,
    operator: &User,
    target: &User,
    level: AccessLevel,
) -> Result<SecretPermissions> {
    let target_key = trusted_key(target)?;
    let operator_key = trusted_key(operator)?;

    let next = permissions
        .cloned()
        .unwrap_or_default()
        .with_role_based(false)
        .with_recipient(&target.email, target_key, level);

    if next.can_write(&operator.email) {
        Ok(next)
    } else {
        Ok(next.with_recipient(&operator.email, operator_key, AccessLevel::Write))
    }
}

/// Remove `email` from a secret's explicit list.
///
/// # Errors
///
/// * `AccessError::SelfRevocation` when `email` is the operator
/// * `AccessError::RoleBased` when the secret has no explicit list
/// * `AccessError::NoExplicitAccess` when `email` is not on the list
pub fn revoke(
    permissions: Option<&SecretPermissions>,
    operator: &User,
    email: &str,
) -> Result<SecretPermissions> {
    if operator.matches_email(email) {
        return Err(AccessError::SelfRevocation.into());
    }
    let current = explicit(permissions).ok_or(AccessError::RoleBased)?;
    let entry = current
        .recipients
        .iter()
        .find(|r| r.email.eq_ignore_ascii_case(email))
        .ok_or_else(|| AccessError::NoExplicitAccess(email.to_string()))?;

    let next = current.without_recipient(&entry.email);
    if next.is_empty() {
        // Never fall back to role-based by emptying the list.
        return Ok(next.with_recipient(&operator.email, trusted_key(operator)?, AccessLevel::Write));
    }
    Ok(next)
}

/// Who can access a secret and how, for display.
pub fn effective_access(
    team: &Team,
    reference: &SecretRef,
    permissions: Option<&SecretPermissions>,
) -> Vec<(Email, AccessLevel)> {
    match explicit(permissions) {
        Some(p) => p
            .recipients
            .iter()
            .map(|r| (r.email.clone(), r.access))
            .collect(),
        None => team
            .members()
            .iter()
            .filter(|u| can_read(u, reference, permissions))
            .map(|u| {
                let level = if can_write(u, reference, permissions) {
                    AccessLevel::Write
                } else {
                    AccessLevel::Read
                };
                (u.email.clone(), level)
            })
            .collect(),
    }
}

fn trusted_key(user: &User) -> Result<&str> {
    if user.verification_pending {
        return Err(TeamError::PendingVerification(user.email.clone()).into());
    }
    user.roster_key()
        .ok_or_else(|| TeamError::NoPublicKey(user.email.clone()).into())
}
