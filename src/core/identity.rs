//! Local identity: the operator's age keypair.
//!
//! The private key is stored in one of two text formats:
//!
//! ```text
//! # created: 2026-01-01T00:00:00Z          -----BEGIN LOCKBOX ENCRYPTED KEY-----
//! # public key: age1...                    # created: ...
//! AGE-SECRET-KEY-1...                      # public key: age1...
//!                                          # encryption: argon2id+xchacha20poly1305
//!                                          # kdf: m=65536,t=3,p=4
//!                                          salt: <base64>
//!                                          nonce: <base64>
//!                                          data: <base64>
//!                                          -----END LOCKBOX ENCRYPTED KEY-----
//! ```
//!
//! A file without `salt`/`nonce`/`data` is a plain key and loads directly.

use std::fs;
use std::path::{Path, PathBuf};

use ::age::secrecy::ExposeSecret;
use ::age::x25519;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::constants::{KEY_ENCRYPTION, PROTECTED_KEY_FOOTER, PROTECTED_KEY_HEADER};
use crate::core::kdf::{self, KdfParams, Sealed};
use crate::core::store::{validate_file_permissions, write_atomic};
use crate::core::types::PublicKey;
use crate::error::{KeyError, Result, ValidationError};

/// A private key identity for decrypting secrets.
pub struct Identity {
    inner: x25519::Identity,
    path: Option<PathBuf>,
    protected: bool,
}

impl Identity {
    /// A fresh identity that only lives in memory.
    pub fn ephemeral() -> Self {
        Self {
            inner: x25519::Identity::generate(),
            path: None,
            protected: false,
        }
    }

    /// Generate a new identity and write it to `path`.
    ///
    /// With a passphrase the key is sealed before it touches disk.
    ///
    /// # Errors
    ///
    /// `KeyError::AlreadyExists` if `path` is already taken; an existing
    /// key is never overwritten.
    pub fn generate(path: &Path, passphrase: Option<&str>) -> Result<Self> {
        debug!("Generating new identity at: {}", path.display());

        if path.exists() {
            return Err(KeyError::AlreadyExists(path.display().to_string()).into());
        }

        let inner = x25519::Identity::generate();
        write_key_file(path, &inner, passphrase, &now())?;

        Ok(Self {
            inner,
            path: Some(path.to_path_buf()),
            protected: passphrase.is_some(),
        })
    }

    /// Load an identity from `path`.
    ///
    /// # Errors
    ///
    /// * `KeyError::NoPrivateKey` if the file does not exist
    /// * `KeyError::PassphraseRequired` if the key is protected and no
    ///   passphrase was given
    /// * `KeyError::InvalidPassphrase` if the passphrase is wrong
    pub fn load(path: &Path, passphrase: Option<&str>) -> Result<Self> {
        debug!("Loading identity from: {}", path.display());

        let file = read_key_file(path)?;
        let protected = file.is_protected();
        let inner = file.unlock(passphrase)?;

        debug!(protected, "Identity loaded");

        Ok(Self {
            inner,
            path: Some(path.to_path_buf()),
            protected,
        })
    }

    pub fn public_key(&self) -> PublicKey {
        self.inner.to_public().to_string()
    }

    /// The inner age identity, for decryption.
    pub fn as_age(&self) -> &x25519::Identity {
        &self.inner
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("path", &self.path)
            .field("public_key", &self.public_key())
            .field("protected", &self.protected)
            .finish()
    }
}

/// Whether the key file at `path` is passphrase-protected.
pub fn is_protected(path: &Path) -> Result<bool> {
    Ok(read_key_file(path)?.is_protected())
}

/// Public key of the identity at `path`, without unlocking it.
///
/// Taken from the `# public key:` comment. A plain key without the
/// comment is parsed instead; a protected key without it is an error.
pub fn read_public_key(path: &Path) -> Result<PublicKey> {
    let file = read_key_file(path)?;
    if let Some(key) = &file.public_key {
        return Ok(key.clone());
    }
    match &file.body {
        KeyBody::Plain(secret) => Ok(parse_secret(secret)?.to_public().to_string()),
        KeyBody::Sealed(_) => {
            Err(KeyError::InvalidFormat("protected key has no public key comment".into()).into())
        }
    }
}

/// Protect a plain key with a passphrase.
pub fn set_passphrase(path: &Path, passphrase: &str) -> Result<()> {
    let file = read_key_file(path)?;
    if file.is_protected() {
        return Err(KeyError::AlreadyProtected.into());
    }
    let inner = file.unlock(None)?;
    write_key_file(path, &inner, Some(passphrase), file.created())?;
    debug!("Passphrase set on {}", path.display());
    Ok(())
}

/// Re-seal a protected key under a new passphrase.
pub fn change_passphrase(path: &Path, old: &str, new: &str) -> Result<()> {
    let file = read_key_file(path)?;
    if !file.is_protected() {
        return Err(KeyError::NotProtected.into());
    }
    let inner = file.unlock(Some(old))?;
    write_key_file(path, &inner, Some(new), file.created())?;
    debug!("Passphrase changed on {}", path.display());
    Ok(())
}

/// Strip passphrase protection, writing the key in plain form.
pub fn remove_passphrase(path: &Path, old: &str) -> Result<()> {
    let file = read_key_file(path)?;
    if !file.is_protected() {
        return Err(KeyError::NotProtected.into());
    }
    let inner = file.unlock(Some(old))?;
    write_key_file(path, &inner, None, file.created())?;
    debug!("Passphrase removed from {}", path.display());
    Ok(())
}

enum KeyBody {
    Plain(Zeroizing<String>),
    Sealed(Sealed),
}

struct KeyFile {
    created: Option<String>,
    public_key: Option<PublicKey>,
    body: KeyBody,
}

impl KeyFile {
    fn is_protected(&self) -> bool {
        matches!(self.body, KeyBody::Sealed(_))
    }

    fn created(&self) -> &str {
        self.created.as_deref().unwrap_or("unknown")
    }

    fn unlock(&self, passphrase: Option<&str>) -> Result<x25519::Identity> {
        let inner = match &self.body {
            KeyBody::Plain(secret) => parse_secret(secret)?,
            KeyBody::Sealed(sealed) => {
                let passphrase = passphrase.ok_or(KeyError::PassphraseRequired)?;
                let opened = kdf::open(passphrase.as_bytes(), sealed)?;
                let secret = std::str::from_utf8(&opened)
                    .map_err(|_| KeyError::InvalidFormat("sealed key is not text".into()))?;
                parse_secret(secret)?
            }
        };

        if let Some(expected) = &self.public_key {
            if inner.to_public().to_string() != *expected {
                return Err(KeyError::InvalidFormat(
                    "public key comment does not match private key".into(),
                )
                .into());
            }
        }
        Ok(inner)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_secret(secret: &str) -> Result<x25519::Identity> {
    secret
        .trim()
        .parse::<x25519::Identity>()
        .map_err(|e: &str| KeyError::InvalidFormat(e.to_string()).into())
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(value.trim())
        .map_err(|e| KeyError::InvalidFormat(format!("bad {}: {}", name, e)).into())
}

fn read_key_file(path: &Path) -> Result<KeyFile> {
    if !path.exists() {
        return Err(KeyError::NoPrivateKey(path.display().to_string()).into());
    }

    if let Err(e) = validate_file_permissions(path, 0o600) {
        warn!(
            "Insecure key file permissions: {}. Run: chmod 600 {}",
            e,
            path.display()
        );
    }

    let contents = Zeroizing::new(fs::read_to_string(path).map_err(KeyError::ReadFailed)?);
    parse_key_file(&contents)
}

fn parse_key_file(contents: &str) -> Result<KeyFile> {
    let mut created = None;
    let mut public_key = None;
    let mut params = None;
    let mut salt = None;
    let mut nonce = None;
    let mut data = None;
    let mut secret = None;
    let mut armored = false;

    for line in contents.lines() {
        let line = line.trim();
        if line == PROTECTED_KEY_HEADER || line == PROTECTED_KEY_FOOTER {
            armored = true;
        } else if let Some(v) = line.strip_prefix("# created:") {
            created = Some(v.trim().to_string());
        } else if let Some(v) = line.strip_prefix("# public key:") {
            public_key = Some(v.trim().to_string());
        } else if let Some(v) = line.strip_prefix("# kdf:") {
            params = Some(
                KdfParams::parse(v)
                    .ok_or_else(|| KeyError::InvalidFormat(format!("bad kdf line: {}", v)))?,
            );
        } else if let Some(v) = line.strip_prefix("salt:") {
            salt = Some(decode_field("salt", v)?);
        } else if let Some(v) = line.strip_prefix("nonce:") {
            nonce = Some(decode_field("nonce", v)?);
        } else if let Some(v) = line.strip_prefix("data:") {
            data = Some(decode_field("data", v)?);
        } else if line.starts_with("AGE-SECRET-KEY-") {
            secret = Some(Zeroizing::new(line.to_string()));
        }
    }

    let body = match (salt, nonce, data) {
        (Some(salt), Some(nonce), Some(data)) => KeyBody::Sealed(Sealed {
            salt,
            nonce,
            data,
            params: params.unwrap_or_else(KdfParams::production),
        }),
        (None, None, None) if !armored => match secret {
            Some(secret) => KeyBody::Plain(secret),
            None => return Err(KeyError::InvalidFormat("no secret key found".into()).into()),
        },
        _ => {
            return Err(KeyError::InvalidFormat("incomplete protected key".into()).into());
        }
    };

    Ok(KeyFile {
        created,
        public_key,
        body,
    })
}

fn write_key_file(
    path: &Path,
    inner: &x25519::Identity,
    passphrase: Option<&str>,
    created: &str,
) -> Result<()> {
    let public_key = inner.to_public().to_string();
    let secret = Zeroizing::new(inner.to_string().expose_secret().to_string());

    let contents = match passphrase {
        None => Zeroizing::new(format!(
            "# created: {}\n# public key: {}\n{}\n",
            created, public_key, *secret
        )),
        Some(passphrase) => {
            if passphrase.is_empty() {
                return Err(ValidationError::EmptyField("passphrase").into());
            }
            let sealed = kdf::seal(passphrase.as_bytes(), secret.as_bytes(), KdfParams::default())?;
            Zeroizing::new(format!(
                "{}\n# created: {}\n# public key: {}\n# encryption: {}\n# kdf: {}\nsalt: {}\nnonce: {}\ndata: {}\n{}\n",
                PROTECTED_KEY_HEADER,
                created,
                public_key,
                KEY_ENCRYPTION,
                sealed.params.render(),
                BASE64.encode(&sealed.salt),
                BASE64.encode(&sealed.nonce),
                BASE64.encode(&sealed.data),
                PROTECTED_KEY_FOOTER,
            ))
        }
    };

    write_atomic(path, contents.as_bytes()).map_err(KeyError::WriteFailed)?;
    Ok(())
}
