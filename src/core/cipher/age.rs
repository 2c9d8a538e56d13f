//! Age encryption backend.
//!
//! Output is the binary age v1 container. Input may be binary or
//! ASCII-armored; the armored reader detects which.

use std::io::{Read, Write};

use ::age::x25519;
use tracing::trace;
use zeroize::Zeroizing;

use super::Cipher;
use crate::core::constants::PUBLIC_KEY_PREFIX;
use crate::core::identity::Identity;
use crate::core::types::{PublicKey, SecretBytes};
use crate::error::{CipherError, Result, ValidationError};

/// Age-based backend holding the local identity.
pub struct Age {
    identity: Identity,
}

impl Age {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl Cipher for Age {
    fn encrypt(&self, plaintext: &[u8], recipients: &[PublicKey]) -> Result<Vec<u8>> {
        let mut keys = recipients.to_vec();
        keys.push(self.identity.public_key());
        encrypt_to(plaintext, &keys)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<SecretBytes> {
        decrypt_with(ciphertext, self.identity.as_age())
    }

    fn public_key(&self) -> PublicKey {
        self.identity.public_key()
    }

    fn name(&self) -> &'static str {
        "age"
    }
}

/// Trim, drop empties and collapse duplicates, keeping first-seen order.
pub fn dedup_keys(keys: &[PublicKey]) -> Vec<PublicKey> {
    let mut out: Vec<PublicKey> = Vec::with_capacity(keys.len());
    for key in keys {
        let key = key.trim();
        if !key.is_empty() && !out.iter().any(|k| k == key) {
            out.push(key.to_string());
        }
    }
    out
}

/// Encrypt for exactly `recipients`, without adding any local key.
///
/// Used where there is no local identity in play, such as sealing a
/// verification challenge to a claimed key.
pub fn encrypt_to(plaintext: &[u8], recipients: &[PublicKey]) -> Result<Vec<u8>> {
    let keys = dedup_keys(recipients);
    if keys.is_empty() {
        return Err(CipherError::NoRecipients.into());
    }

    let parsed = keys
        .iter()
        .map(|k| parse_recipient(k))
        .collect::<Result<Vec<_>>>()?;

    trace!(
        recipients = parsed.len(),
        plaintext_len = plaintext.len(),
        "encrypting"
    );

    let encryptor =
        ::age::Encryptor::with_recipients(parsed.iter().map(|r| r as &dyn ::age::Recipient))
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

    let mut encrypted = Vec::with_capacity(plaintext.len() + 200 * parsed.len());
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
    writer
        .write_all(plaintext)
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

    trace!(ciphertext_len = encrypted.len(), "encrypted");
    Ok(encrypted)
}

/// Decrypt with a bare age identity.
pub(crate) fn decrypt_with(ciphertext: &[u8], identity: &x25519::Identity) -> Result<SecretBytes> {
    trace!(ciphertext_len = ciphertext.len(), "decrypting");

    let reader = ::age::armor::ArmoredReader::new(ciphertext);
    let decryptor = ::age::Decryptor::new(reader)
        .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

    let mut stream = decryptor
        .decrypt(std::iter::once(identity as &dyn ::age::Identity))
        .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

    // On a tag failure part of the stream may already be buffered; the
    // Zeroizing wrapper wipes it when we bail out.
    let mut plaintext = Zeroizing::new(Vec::new());
    stream
        .read_to_end(&mut *plaintext)
        .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

    trace!(plaintext_len = plaintext.len(), "decrypted");
    Ok(plaintext)
}

/// Parse a public key string into an age recipient.
///
/// # Errors
///
/// `ValidationError::InvalidPublicKey` if the key is not a valid x25519
/// recipient.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient> {
    let key = key.trim();
    if !key.starts_with(PUBLIC_KEY_PREFIX) {
        return Err(ValidationError::InvalidPublicKey(key.to_string()).into());
    }
    key.parse::<x25519::Recipient>()
        .map_err(|_| ValidationError::InvalidPublicKey(key.to_string()).into())
}

pub fn is_valid_public_key(key: &str) -> bool {
    parse_recipient(key).is_ok()
}
