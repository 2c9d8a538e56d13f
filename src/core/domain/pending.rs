//! Pending key-ownership challenges.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::constants::PENDING_FILE;
use crate::core::types::{Email, PublicKey};
use crate::error::{Result, StoreError};

/// One outstanding challenge. At most one per email.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PendingVerification {
    #[zeroize(skip)]
    pub email: Email,
    #[zeroize(skip)]
    pub public_key: PublicKey,
    /// Plaintext challenge, base64. Never leaves the issuing machine.
    pub challenge: String,
    /// Challenge encrypted to `public_key`, base64. Safe to send.
    #[zeroize(skip)]
    pub encrypted_challenge: String,
    #[zeroize(skip)]
    pub created_at: DateTime<Utc>,
    #[zeroize(skip)]
    pub expires_at: DateTime<Utc>,
}

impl PendingVerification {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl fmt::Debug for PendingVerification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingVerification")
            .field("email", &self.email)
            .field("public_key", &self.public_key)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Contents of the pending file, rewritten whole on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingList {
    #[serde(default, rename = "verification")]
    pub entries: Vec<PendingVerification>,
}

impl PendingList {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| {
            StoreError::Malformed {
                file: PENDING_FILE,
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn render(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            StoreError::Malformed {
                file: PENDING_FILE,
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn find(&self, email: &str) -> Option<&PendingVerification> {
        self.entries
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
    }

    pub fn remove(&mut self, email: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|p| !p.email.eq_ignore_ascii_case(email));
        self.entries.len() != before
    }

    /// Insert, replacing any entry for the same email.
    pub fn upsert(&mut self, entry: PendingVerification) {
        self.remove(&entry.email);
        self.entries.push(entry);
    }
}
