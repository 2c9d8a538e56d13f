//! Error types.
//!
//! One top-level [`Error`] wraps a category enum per concern. Callers that
//! only need to know *what kind* of failure happened (the CLI, mostly) use
//! [`Error::kind`].

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Team(#[from] TeamError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed secret payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Input validation failures. Always raised before any I/O.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("invalid role: {0} (valid: dev, staging-access, prod-access, admin)")]
    InvalidRole(String),

    #[error("invalid stage: {0} (valid: dev, staging, prod)")]
    InvalidStage(String),

    #[error("invalid access level: {0} (use 'read' or 'write')")]
    InvalidAccessLevel(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("invalid {field} '{value}': {reason}")]
    InvalidName {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid permissions on {path}: expected {expected}, got {actual}")]
    InvalidPermissions {
        path: String,
        expected: String,
        actual: String,
    },
}

/// Encryption backend failures.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("no recipients: refusing to encrypt for nobody")]
    NoRecipients,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
}

/// Private key (identity) failures.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("no private key found at {0}")]
    NoPrivateKey(String),

    #[error("private key already exists at {0}")]
    AlreadyExists(String),

    #[error("invalid passphrase")]
    InvalidPassphrase,

    #[error("passphrase required for protected key")]
    PassphraseRequired,

    #[error("key is not passphrase-protected")]
    NotProtected,

    #[error("key is already passphrase-protected")]
    AlreadyProtected,

    #[error("invalid key file: {0}")]
    InvalidFormat(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("failed to write key file: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("failed to read key file: {0}")]
    ReadFailed(#[source] std::io::Error),
}

/// Storage collaborator failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store not initialized at {0}")]
    NotInitialized(String),

    #[error("malformed {file}: {reason}")]
    Malformed { file: &'static str, reason: String },
}

/// Authorization and recipient-resolution failures.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("access denied")]
    Denied,

    #[error("cannot revoke your own access")]
    SelfRevocation,

    #[error("secret uses role-based access; grant explicit access first")]
    RoleBased,

    #[error("{0} has no explicit access to this secret")]
    NoExplicitAccess(String),
}

/// Team roster failures.
#[derive(Error, Debug)]
pub enum TeamError {
    #[error("member not found: {0}")]
    MemberNotFound(String),

    #[error("member already exists: {0}")]
    MemberExists(String),

    #[error("{0} has no public key yet")]
    NoPublicKey(String),

    #[error("{0} is not pending verification")]
    NotPending(String),

    #[error("{0} is still pending key verification")]
    PendingVerification(String),

    #[error("{email} must keep at least one role")]
    LastRole { email: String },

    #[error("cannot remove your own admin role")]
    SelfDemotion,
}

/// Key-ownership verification failures.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("verification challenge for {0} has expired; issue a new one")]
    ChallengeExpired(String),

    #[error("no pending verification challenge for {0}")]
    ChallengeNotFound(String),

    #[error("verification response for {0} does not match the challenge")]
    ChallengeMismatch(String),

    #[error("malformed challenge: {0}")]
    Malformed(String),
}

/// Configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("missing config field: {field}")]
    MissingField { field: &'static str },

    #[error("unable to determine {0} directory")]
    NoDirectory(&'static str),
}

/// Coarse classification of an [`Error`], stable for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    AccessDenied,
    InvalidInput,
    NoRecipients,
    DecryptionFailed,
    InvalidPassphrase,
    ChallengeExpired,
    ChallengeNotFound,
    ChallengeMismatch,
    Io,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::InvalidInput,
            Error::Cipher(e) => match e {
                CipherError::NoRecipients => ErrorKind::NoRecipients,
                CipherError::DecryptionFailed(_) => ErrorKind::DecryptionFailed,
                CipherError::EncryptionFailed(_) => ErrorKind::Io,
            },
            Error::Key(e) => match e {
                KeyError::NoPrivateKey(_) => ErrorKind::NotFound,
                KeyError::AlreadyExists(_) => ErrorKind::AlreadyExists,
                KeyError::InvalidPassphrase | KeyError::PassphraseRequired => {
                    ErrorKind::InvalidPassphrase
                }
                KeyError::NotProtected | KeyError::AlreadyProtected | KeyError::InvalidFormat(_) => {
                    ErrorKind::InvalidInput
                }
                KeyError::KeyDerivation(_) | KeyError::WriteFailed(_) | KeyError::ReadFailed(_) => {
                    ErrorKind::Io
                }
            },
            Error::Store(e) => match e {
                StoreError::NotFound(_) | StoreError::NotInitialized(_) => ErrorKind::NotFound,
                StoreError::AlreadyExists(_) => ErrorKind::AlreadyExists,
                StoreError::Malformed { .. } => ErrorKind::InvalidInput,
                StoreError::ReadFailed { .. } | StoreError::WriteFailed { .. } => ErrorKind::Io,
            },
            Error::Access(e) => match e {
                AccessError::Denied => ErrorKind::AccessDenied,
                AccessError::SelfRevocation | AccessError::RoleBased => ErrorKind::InvalidInput,
                AccessError::NoExplicitAccess(_) => ErrorKind::NotFound,
            },
            Error::Team(e) => match e {
                TeamError::MemberNotFound(_) => ErrorKind::NotFound,
                TeamError::MemberExists(_) => ErrorKind::AlreadyExists,
                TeamError::NoPublicKey(_)
                | TeamError::NotPending(_)
                | TeamError::PendingVerification(_)
                | TeamError::LastRole { .. }
                | TeamError::SelfDemotion => ErrorKind::InvalidInput,
            },
            Error::Verify(e) => match e {
                VerifyError::ChallengeExpired(_) => ErrorKind::ChallengeExpired,
                VerifyError::ChallengeNotFound(_) => ErrorKind::ChallengeNotFound,
                VerifyError::ChallengeMismatch(_) | VerifyError::Malformed(_) => {
                    ErrorKind::ChallengeMismatch
                }
            },
            Error::Config(ConfigError::MissingField { .. }) => ErrorKind::InvalidInput,
            Error::Config(_) => ErrorKind::Io,
            Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) => ErrorKind::DecryptionFailed,
            Error::Other(_) => ErrorKind::Io,
        }
    }
}

impl From<dialoguer::Error> for Error {
    fn from(e: dialoguer::Error) -> Self {
        Error::Other(format!("prompt failed: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
