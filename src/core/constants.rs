//! Constants used throughout lockbox.
//!
//! Centralizes file names, format markers and cryptographic parameters.

/// Extension appended to every encrypted secret file.
pub const SECRET_EXT: &str = ".age";

/// Directory holding credential secrets.
pub const CREDENTIALS_DIR: &str = "credentials";

/// Directory holding per-project environment secrets.
pub const PROJECTS_DIR: &str = "projects";

/// Team member list, relative to the store root.
pub const TEAM_FILE: &str = ".lockbox-team.toml";

/// Team-wide recipients roster, relative to the store root.
pub const RECIPIENTS_FILE: &str = ".lockbox-recipients";

/// Pending key verifications, relative to the store root.
pub const PENDING_FILE: &str = ".lockbox-pending.toml";

/// Header written at the top of the recipients roster.
pub const RECIPIENTS_HEADER: &str =
    "# lockbox recipients - verified team members\n# Format: <age-public-key> # <email>\n";

/// Prefix every age x25519 public key starts with.
pub const PUBLIC_KEY_PREFIX: &str = "age1";

/// Config directory name under the platform config dir.
pub const CONFIG_DIR: &str = "lockbox";

/// Config file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Default private key file name inside the config dir.
pub const IDENTITY_FILE: &str = "identity";

/// Default store directory relative to HOME.
pub const STORE_DIR: &str = ".lockbox";

/// Markers around a passphrase-protected private key.
pub const PROTECTED_KEY_HEADER: &str = "-----BEGIN LOCKBOX ENCRYPTED KEY-----";
pub const PROTECTED_KEY_FOOTER: &str = "-----END LOCKBOX ENCRYPTED KEY-----";

/// KDF/AEAD identifier recorded in protected key files.
pub const KEY_ENCRYPTION: &str = "argon2id+xchacha20poly1305";

/// Argon2id time cost.
pub const ARGON2_TIME: u32 = 3;

/// Argon2id memory cost in KiB (64 MiB).
pub const ARGON2_MEMORY_KIB: u32 = 64 * 1024;

/// Argon2id lanes.
pub const ARGON2_PARALLELISM: u32 = 4;

/// Highest Argon2id time cost accepted from a key file.
pub const ARGON2_MAX_TIME: u32 = 10;

/// Highest Argon2id lane count accepted from a key file.
pub const ARGON2_MAX_PARALLELISM: u32 = 16;

/// Derived key length in bytes.
pub const DERIVED_KEY_LEN: usize = 32;

/// Salt length for passphrase derivation.
pub const SALT_LEN: usize = 16;

/// XChaCha20-Poly1305 nonce length.
pub const NONCE_LEN: usize = 24;

/// Random challenge length for key verification.
pub const CHALLENGE_LEN: usize = 32;

/// Lifetime of a verification challenge, in hours.
pub const CHALLENGE_TTL_HOURS: i64 = 24;
