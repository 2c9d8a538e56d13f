//! Lockbox - a serverless team secret store.
//!
//! Every secret is encrypted on its own for exactly the people allowed to
//! read it, and lives as one file in a version-controlled tree.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Create a store, generate keys
//! │   ├── team          # Invite, verify, revoke, roles
//! │   ├── access        # Per-secret grants
//! │   ├── cred / env    # Secret CRUD
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── cipher/       # Cipher trait + age backend
//!     ├── identity      # Local keypair, passphrase protection
//!     ├── kdf           # Argon2id + XChaCha20-Poly1305 envelope
//!     ├── domain/       # Roles, team, roster, secrets (no I/O)
//!     ├── resolver      # Who a secret is encrypted for
//!     ├── access        # Authorization, per-secret grant/revoke
//!     ├── reencrypt     # Batch re-encryption with per-file results
//!     ├── verification  # Key ownership challenges
//!     ├── store/        # Store trait + filesystem implementation
//!     ├── config        # config.toml
//!     └── vault/        # Facade over all of the above
//! ```
//!
//! # Features
//!
//! - Age encryption with x25519 keys, one file per secret
//! - Role and stage based access, with per-secret overrides
//! - Revocation with re-encryption of every affected secret
//! - Challenge-response verification before a new key is trusted
//! - Passphrase-protected private keys (Argon2id)

pub mod cli;
pub mod core;
pub mod error;
