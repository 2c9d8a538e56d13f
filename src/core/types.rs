//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use zeroize::Zeroizing;

/// An age public key string (starts with "age1...").
///
/// Self-describing; used to wrap a secret's payload key for one recipient.
pub type PublicKey = String;

/// A team member's email address. The stable identity of a member.
pub type Email = String;

/// A store-relative path (`credentials/github.com/bot.age`).
pub type StorePath = String;

/// Plaintext bytes that are wiped when dropped, on every exit path.
pub type SecretBytes = Zeroizing<Vec<u8>>;
