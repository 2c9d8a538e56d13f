//! Key-ownership verification.
//!
//! Before a claimed public key is trusted, the claimant proves they hold
//! the matching private key:
//!
//! 1. **Issue**: 32 random bytes are encrypted to the claimed key. Only
//!    the encrypted form is handed out; the plaintext stays in the local
//!    pending file, valid for 24 hours.
//! 2. **Respond**: the claimant decrypts and sends back the bytes, base64.
//! 3. **Verify**: the response must equal the stored challenge. Success
//!    consumes the record. An expired record is deleted and reported as
//!    expired; a missing one as not found.
//!
//! Issuing again for the same email replaces the previous challenge.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Duration, Utc};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::cipher::{encrypt_to, Cipher};
use crate::core::constants::{CHALLENGE_LEN, CHALLENGE_TTL_HOURS, PENDING_FILE};
use crate::core::domain::{PendingList, PendingVerification};
use crate::core::kdf::random_bytes;
use crate::core::store::Store;
use crate::core::types::PublicKey;
use crate::core::validation::validate_public_key;
use crate::error::{Error, Result, StoreError, VerifyError};

/// Issues and checks challenges, persisting them in `store`.
pub struct Verifier<S: Store> {
    store: S,
}

impl<S: Store> Verifier<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load(&self) -> Result<PendingList> {
        match self.store.get(PENDING_FILE) {
            Ok(bytes) => {
                let text = String::from_utf8(bytes).map_err(|e| StoreError::Malformed {
                    file: PENDING_FILE,
                    reason: e.to_string(),
                })?;
                PendingList::parse(&text)
            }
            Err(Error::Store(StoreError::NotFound(_))) => Ok(PendingList::default()),
            Err(e) => Err(e),
        }
    }

    fn save(&self, list: &PendingList) -> Result<()> {
        if list.entries.is_empty() {
            if self.store.exists(PENDING_FILE) {
                self.store.delete(PENDING_FILE)?;
            }
            return Ok(());
        }
        let text = Zeroizing::new(list.render()?);
        self.store.set(PENDING_FILE, text.as_bytes())
    }

    pub fn issue(&self, email: &str, public_key: &str) -> Result<PendingVerification> {
        self.issue_at(email, public_key, Utc::now())
    }

    /// Issue a challenge as of `now`.
    pub fn issue_at(
        &self,
        email: &str,
        public_key: &str,
        now: DateTime<Utc>,
    ) -> Result<PendingVerification> {
        validate_public_key(public_key)?;

        let challenge = Zeroizing::new(random_bytes::<CHALLENGE_LEN>());
        let encrypted = encrypt_to(&challenge[..], &[public_key.to_string()])?;

        let entry = PendingVerification {
            email: email.to_string(),
            public_key: public_key.trim().to_string(),
            challenge: BASE64.encode(&challenge[..]),
            encrypted_challenge: BASE64.encode(&encrypted),
            created_at: now,
            expires_at: now + Duration::hours(CHALLENGE_TTL_HOURS),
        };

        let mut list = self.load()?;
        list.upsert(entry.clone());
        self.save(&list)?;

        debug!(email, expires_at = %entry.expires_at, "issued verification challenge");
        Ok(entry)
    }

    /// Check a response. On success returns the now-verified key.
    pub fn verify(&self, email: &str, response: &str) -> Result<PublicKey> {
        self.verify_at(email, response, Utc::now())
    }

    pub fn verify_at(&self, email: &str, response: &str, now: DateTime<Utc>) -> Result<PublicKey> {
        let mut list = self.load()?;
        let entry = list
            .find(email)
            .cloned()
            .ok_or_else(|| VerifyError::ChallengeNotFound(email.to_string()))?;

        if entry.is_expired_at(now) {
            list.remove(email);
            self.save(&list)?;
            debug!(email, "verification challenge expired");
            return Err(VerifyError::ChallengeExpired(email.to_string()).into());
        }

        let expected = Zeroizing::new(
            BASE64
                .decode(&entry.challenge)
                .map_err(|e| VerifyError::Malformed(e.to_string()))?,
        );
        let actual = Zeroizing::new(
            BASE64
                .decode(response.trim())
                .map_err(|_| VerifyError::ChallengeMismatch(email.to_string()))?,
        );

        if !bool::from(expected.as_slice().ct_eq(actual.as_slice())) {
            return Err(VerifyError::ChallengeMismatch(email.to_string()).into());
        }

        list.remove(email);
        self.save(&list)?;
        debug!(email, "verification succeeded");
        Ok(entry.public_key.clone())
    }

    /// The live challenge for `email`.
    pub fn pending(&self, email: &str) -> Result<PendingVerification> {
        self.pending_at(email, Utc::now())
    }

    pub fn pending_at(&self, email: &str, now: DateTime<Utc>) -> Result<PendingVerification> {
        let list = self.load()?;
        let entry = list
            .find(email)
            .ok_or_else(|| VerifyError::ChallengeNotFound(email.to_string()))?;
        if entry.is_expired_at(now) {
            return Err(VerifyError::ChallengeExpired(email.to_string()).into());
        }
        Ok(entry.clone())
    }

    /// The transmittable (encrypted, base64) challenge for `email`.
    pub fn encrypted_challenge(&self, email: &str) -> Result<String> {
        Ok(self.pending(email)?.encrypted_challenge.clone())
    }

    /// Every stored challenge, expired ones included.
    pub fn list(&self) -> Result<Vec<PendingVerification>> {
        Ok(self.load()?.entries.clone())
    }

    /// Drop the challenge for `email`, if any.
    pub fn cancel(&self, email: &str) -> Result<bool> {
        let mut list = self.load()?;
        let removed = list.remove(email);
        if removed {
            self.save(&list)?;
        }
        Ok(removed)
    }

    pub fn cleanup_expired(&self) -> Result<usize> {
        self.cleanup_expired_at(Utc::now())
    }

    /// Remove every expired challenge; returns how many were removed.
    pub fn cleanup_expired_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut list = self.load()?;
        let before = list.entries.len();
        list.entries.retain(|p| !p.is_expired_at(now));
        let removed = before - list.entries.len();
        if removed > 0 {
            self.save(&list)?;
        }
        Ok(removed)
    }
}

/// Claimant side: decrypt a challenge and encode the response.
pub fn respond(cipher: &impl Cipher, encrypted_challenge: &str) -> Result<Zeroizing<String>> {
    let encrypted = BASE64
        .decode(encrypted_challenge.trim())
        .map_err(|e| VerifyError::Malformed(e.to_string()))?;
    let challenge = cipher.decrypt(&encrypted)?;
    Ok(Zeroizing::new(BASE64.encode(challenge.as_slice())))
}

/// Text to send to the claimant along with the encrypted challenge.
pub fn instructions(email: &str, encrypted_challenge: &str) -> String {
    format!(
        "To finish joining, prove you hold the private key for the public key you shared.\n\
         \n\
         1. Run:\n\
         \n\
         \x20   lockbox respond {}\n\
         \n\
         2. Send the printed response back to the admin who invited {}.\n\
         \n\
         The challenge expires in {} hours.\n",
        encrypted_challenge, email, CHALLENGE_TTL_HOURS
    )
}
