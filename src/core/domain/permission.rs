//! Per-secret recipient overrides.

use serde::{Deserialize, Serialize};

use super::AccessLevel;
use crate::core::types::{Email, PublicKey};

/// One explicitly allowed recipient of a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientPermission {
    pub email: Email,
    pub public_key: PublicKey,
    pub access: AccessLevel,
}

/// Explicit allow-list attached to a single secret.
///
/// When empty, or when `use_role_based_access` is set, the list is ignored
/// and the secret is resolved by role. Otherwise it is authoritative and
/// exclusive.
///
/// Mutators take `&self` and return the new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretPermissions {
    #[serde(default)]
    pub recipients: Vec<RecipientPermission>,
    #[serde(default)]
    pub use_role_based_access: bool,
}

impl SecretPermissions {
    /// Whether the explicit list governs this secret.
    pub fn is_explicit(&self) -> bool {
        !self.use_role_based_access && !self.recipients.is_empty()
    }

    /// Add a recipient, or update the access of an entry with the same
    /// email or the same key.
    pub fn with_recipient(&self, email: &str, public_key: &str, access: AccessLevel) -> Self {
        let mut recipients = self.recipients.clone();
        match recipients
            .iter_mut()
            .find(|r| r.email == email || r.public_key == public_key)
        {
            Some(existing) => existing.access = access,
            None => recipients.push(RecipientPermission {
                email: email.to_string(),
                public_key: public_key.to_string(),
                access,
            }),
        }
        Self {
            recipients,
            use_role_based_access: self.use_role_based_access,
        }
    }

    pub fn without_recipient(&self, email: &str) -> Self {
        Self {
            recipients: self
                .recipients
                .iter()
                .filter(|r| r.email != email)
                .cloned()
                .collect(),
            use_role_based_access: self.use_role_based_access,
        }
    }

    /// Drop every entry holding `public_key`.
    pub fn without_key(&self, public_key: &str) -> Self {
        Self {
            recipients: self
                .recipients
                .iter()
                .filter(|r| r.public_key != public_key)
                .cloned()
                .collect(),
            use_role_based_access: self.use_role_based_access,
        }
    }

    pub fn with_role_based(&self, use_role_based_access: bool) -> Self {
        Self {
            recipients: self.recipients.clone(),
            use_role_based_access,
        }
    }

    pub fn access_of(&self, email: &str) -> Option<AccessLevel> {
        self.recipients
            .iter()
            .find(|r| r.email == email)
            .map(|r| r.access)
    }

    pub fn access_of_key(&self, public_key: &str) -> Option<AccessLevel> {
        self.recipients
            .iter()
            .find(|r| r.public_key == public_key)
            .map(|r| r.access)
    }

    pub fn can_read(&self, email: &str) -> bool {
        self.access_of(email).is_some()
    }

    pub fn can_write(&self, email: &str) -> bool {
        self.access_of(email).is_some_and(|a| a.can_write())
    }

    pub fn has_recipient(&self, email: &str) -> bool {
        self.access_of(email).is_some()
    }

    /// Keys that can decrypt: read and write entries alike.
    pub fn read_keys(&self) -> Vec<PublicKey> {
        self.recipients.iter().map(|r| r.public_key.clone()).collect()
    }

    pub fn write_keys(&self) -> Vec<PublicKey> {
        self.recipients
            .iter()
            .filter(|r| r.access.can_write())
            .map(|r| r.public_key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}
