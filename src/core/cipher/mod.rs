//! Per-secret encryption.
//!
//! A [`Cipher`] seals one plaintext for many recipients and opens it again
//! with the local identity. The only backend is [`Age`]: x25519 key
//! wrapping over a single payload key, written as a binary age container.

use crate::core::types::{PublicKey, SecretBytes};
use crate::error::Result;

mod age;

pub use age::{dedup_keys, encrypt_to, is_valid_public_key, parse_recipient, Age};

/// Encryption backend bound to one local identity.
pub trait Cipher {
    /// Encrypt `plaintext` so that every key in `recipients` can open it.
    ///
    /// The backend's own public key is always added, so the writer can
    /// read back what it wrote. Duplicate keys are collapsed, keeping the
    /// first occurrence.
    ///
    /// # Errors
    ///
    /// `CipherError::NoRecipients` if nothing is left to encrypt for, or
    /// `ValidationError::InvalidPublicKey` for a malformed key.
    fn encrypt(&self, plaintext: &[u8], recipients: &[PublicKey]) -> Result<Vec<u8>>;

    /// Decrypt with the local private key.
    ///
    /// Fails with `CipherError::DecryptionFailed` when the local key is not
    /// a recipient or the ciphertext was tampered with. No partial
    /// plaintext is ever returned.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<SecretBytes>;

    /// Public half of the local identity.
    fn public_key(&self) -> PublicKey;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}
