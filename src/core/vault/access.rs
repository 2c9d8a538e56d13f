//! Per-secret access operations.

use tracing::info;

use super::Vault;
use crate::core::access;
use crate::core::domain::{AccessLevel, SecretRef};
use crate::core::store::Store;
use crate::core::types::Email;
use crate::core::validation::normalize_email;
use crate::error::{Result, StoreError};

impl<S: Store> Vault<S> {
    /// Give a member explicit access to one secret and re-encrypt it.
    ///
    /// The first grant on a secret switches it from role-based to
    /// explicit access. The operator keeps write access.
    pub fn grant_access(&self, reference: &SecretRef, email: &str, level: AccessLevel) -> Result<()> {
        let email = normalize_email(email)?;
        let team = self.team()?;
        let (operator, existing) = self.authorize_write(&team, reference)?;
        let mut secret = existing.ok_or_else(|| StoreError::NotFound(reference.to_string()))?;
        let target = team.require(&email)?;

        let permissions = access::grant(secret.permissions(), &operator, target, level)?;
        secret.set_permissions(Some(permissions));
        secret.touch(&operator.email);
        self.write_secret(&team, &secret)?;

        info!(secret = %reference, email = %email, %level, "granted access");
        Ok(())
    }

    /// Take a member off a secret's explicit list and re-encrypt it.
    pub fn revoke_access(&self, reference: &SecretRef, email: &str) -> Result<()> {
        let email = normalize_email(email)?;
        let team = self.team()?;
        let (operator, existing) = self.authorize_write(&team, reference)?;
        let mut secret = existing.ok_or_else(|| StoreError::NotFound(reference.to_string()))?;

        let permissions = access::revoke(secret.permissions(), &operator, &email)?;
        secret.set_permissions(Some(permissions));
        secret.touch(&operator.email);
        self.write_secret(&team, &secret)?;

        info!(secret = %reference, email = %email, "revoked access");
        Ok(())
    }

    /// Who can open a secret, and whether they may change it.
    pub fn access_list(&self, reference: &SecretRef) -> Result<Vec<(Email, AccessLevel)>> {
        let team = self.team()?;
        self.operator_in(&team)?;
        let secret = self.read_secret(reference)?;
        Ok(access::effective_access(&team, reference, secret.permissions()))
    }
}
