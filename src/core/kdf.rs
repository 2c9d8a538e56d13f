//! Passphrase envelope for private keys at rest.
//!
//! Argon2id derives a 256-bit key from the passphrase, XChaCha20-Poly1305
//! seals the serialized private key. Every derived key and every opened
//! plaintext lives in a [`Zeroizing`] buffer, so it is wiped on all exit
//! paths including early returns and panics.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::trace;
use zeroize::Zeroizing;

use crate::core::constants::{
    ARGON2_MAX_PARALLELISM, ARGON2_MAX_TIME, ARGON2_MEMORY_KIB, ARGON2_PARALLELISM, ARGON2_TIME,
    DERIVED_KEY_LEN, KEY_ENCRYPTION, NONCE_LEN, SALT_LEN,
};
use crate::core::types::SecretBytes;
use crate::error::{KeyError, Result};

/// Argon2id cost parameters, recorded alongside every sealed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub time: u32,
    pub parallelism: u32,
}

impl KdfParams {
    /// Parameters used for every newly protected key.
    pub const fn production() -> Self {
        Self {
            memory_kib: ARGON2_MEMORY_KIB,
            time: ARGON2_TIME,
            parallelism: ARGON2_PARALLELISM,
        }
    }

    /// Render as the `# kdf:` metadata value, e.g. `m=65536,t=3,p=4`.
    pub fn render(&self) -> String {
        format!("m={},t={},p={}", self.memory_kib, self.time, self.parallelism)
    }

    /// Parse the `# kdf:` metadata value. Unknown fields are ignored.
    ///
    /// The line is not authenticated, so costs above the production
    /// memory and the time and lane ceilings are refused before any
    /// derivation is attempted.
    pub fn parse(s: &str) -> Option<Self> {
        let mut params = Self::production();
        for part in s.split(',') {
            let (name, value) = part.trim().split_once('=')?;
            let value: u32 = value.trim().parse().ok()?;
            match name.trim() {
                "m" => params.memory_kib = value,
                "t" => params.time = value,
                "p" => params.parallelism = value,
                _ => {}
            }
        }
        params.is_within_limits().then_some(params)
    }

    fn is_within_limits(&self) -> bool {
        (1..=ARGON2_MEMORY_KIB).contains(&self.memory_kib)
            && (1..=ARGON2_MAX_TIME).contains(&self.time)
            && (1..=ARGON2_MAX_PARALLELISM).contains(&self.parallelism)
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.memory_kib,
            self.time,
            self.parallelism,
            Some(DERIVED_KEY_LEN),
        )
        .map_err(|e| KeyError::KeyDerivation(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for KdfParams {
    #[cfg(not(test))]
    fn default() -> Self {
        Self::production()
    }

    // Unit tests only: 1 MiB / 1 pass. Never reachable from a release build.
    #[cfg(test)]
    fn default() -> Self {
        Self {
            memory_kib: 1024,
            time: 1,
            parallelism: 1,
        }
    }
}

/// A sealed private key: the three base64 fields of a protected key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub data: Vec<u8>,
    pub params: KdfParams,
}

/// Fill a fresh buffer from the OS RNG.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Derive a 256-bit key from a passphrase and salt.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; DERIVED_KEY_LEN]>> {
    trace!(m = params.memory_kib, t = params.time, p = params.parallelism, "deriving key");
    let mut key = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    params
        .argon2()?
        .hash_password_into(passphrase, salt, key.as_mut())
        .map_err(|e| KeyError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Seal `plaintext` under a key derived from `passphrase`.
pub fn seal(passphrase: &[u8], plaintext: &[u8], params: KdfParams) -> Result<Sealed> {
    let salt: [u8; SALT_LEN] = random_bytes();
    let nonce: [u8; NONCE_LEN] = random_bytes();

    let key = derive_key(passphrase, &salt, &params)?;
    let aead = XChaCha20Poly1305::new_from_slice(key.as_ref())
        .map_err(|e| KeyError::KeyDerivation(e.to_string()))?;

    let data = aead
        .encrypt(
            XNonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: KEY_ENCRYPTION.as_bytes(),
            },
        )
        .map_err(|_| KeyError::KeyDerivation("sealing failed".to_string()))?;

    Ok(Sealed {
        salt: salt.to_vec(),
        nonce: nonce.to_vec(),
        data,
        params,
    })
}

/// Open a sealed key.
///
/// Any authentication failure is reported as [`KeyError::InvalidPassphrase`].
/// The tag check is constant-time, so how much of a wrong passphrase
/// "matched" is not observable.
pub fn open(passphrase: &[u8], sealed: &Sealed) -> Result<SecretBytes> {
    if sealed.nonce.len() != NONCE_LEN {
        return Err(KeyError::InvalidFormat(format!(
            "nonce must be {} bytes, got {}",
            NONCE_LEN,
            sealed.nonce.len()
        ))
        .into());
    }

    let key = derive_key(passphrase, &sealed.salt, &sealed.params)?;
    let aead = XChaCha20Poly1305::new_from_slice(key.as_ref())
        .map_err(|e| KeyError::KeyDerivation(e.to_string()))?;

    let plaintext = aead
        .decrypt(
            XNonce::from_slice(&sealed.nonce),
            Payload {
                msg: &sealed.data,
                aad: KEY_ENCRYPTION.as_bytes(),
            },
        )
        .map_err(|_| KeyError::InvalidPassphrase)?;

    Ok(Zeroizing::new(plaintext))
}
