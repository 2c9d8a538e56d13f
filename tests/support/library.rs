//! In-process helpers: several members sharing one store on disk.

use std::path::PathBuf;

use lockbox::core::identity::Identity;
use lockbox::core::store::Filesystem;
use lockbox::core::vault::Vault;
use tempfile::TempDir;

/// A shared store plus per-member key files and local state.
pub struct Shared {
    pub tmp: TempDir,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("store")
    }

    pub fn store(&self) -> Filesystem {
        Filesystem::new(self.root())
    }

    fn key_path(&self, email: &str) -> PathBuf {
        self.tmp.path().join("keys").join(email)
    }

    /// The member's key, generated on first use.
    pub fn identity(&self, email: &str) -> Identity {
        let path = self.key_path(email);
        if path.exists() {
            Identity::load(&path, None).expect("failed to load key")
        } else {
            Identity::generate(&path, None).expect("failed to generate key")
        }
    }

    pub fn public_key(&self, email: &str) -> String {
        self.identity(email).public_key()
    }

    fn state(&self, email: &str) -> PathBuf {
        self.tmp.path().join("state").join(email)
    }

    /// Create the store with `email` as first admin.
    pub fn init(&self, email: &str) -> Vault {
        Vault::init(self.store(), self.identity(email), email, email, self.state(email))
            .expect("failed to init store")
    }

    /// Act as `email` without any membership check.
    pub fn open(&self, email: &str) -> Vault {
        Vault::open(self.store(), self.identity(email), email, self.state(email))
            .expect("failed to open store")
    }

    /// Act as `email` while holding `key_owner`'s key and local state.
    pub fn open_with_key(&self, email: &str, key_owner: &str) -> Vault {
        Vault::open(
            self.store(),
            self.identity(key_owner),
            email,
            self.state(key_owner),
        )
        .expect("failed to open store")
    }

    /// Raw ciphertext of a secret, bypassing the vault.
    pub fn ciphertext(&self, store_path: &str) -> Vec<u8> {
        std::fs::read(self.root().join(store_path)).expect("failed to read secret file")
    }
}
