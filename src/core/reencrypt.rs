//! Re-encryption of stored secrets.
//!
//! Each file is an independent unit: read, decrypt with the operator's
//! identity, resolve recipients against the current team, encrypt, write
//! back atomically. A failing file is recorded and the batch carries on,
//! so every file ends up either fully old or fully new.
//!
//! Re-encrypting is the only way to cut a revoked key off from existing
//! secrets. It cannot take back what that key's holder already decrypted.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::core::cipher::Cipher;
use crate::core::constants::{CREDENTIALS_DIR, PROJECTS_DIR};
use crate::core::domain::{AccessLevel, Secret, SecretRef, Team};
use crate::core::resolver::Resolver;
use crate::core::store::Store;
use crate::core::types::{PublicKey, StorePath};
use crate::error::Result;

/// Which files to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Credentials,
    Projects,
    /// Exactly these store paths, e.g. the failures of an earlier run.
    Paths(Vec<StorePath>),
}

/// A single file that could not be re-encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub path: StorePath,
    pub reason: String,
}

/// Outcome of a batch. Failures are data, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Secret files attempted.
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Non-secret files that were listed but left alone.
    pub skipped: usize,
    pub errors: Vec<FileError>,
}

impl Stats {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    /// Paths to pass back as [`Scope::Paths`] to retry.
    pub fn failed_paths(&self) -> Vec<StorePath> {
        self.errors.iter().map(|e| e.path.clone()).collect()
    }
}

/// Re-encrypts secrets for one team snapshot.
pub struct Reencryptor<'a, S: Store, C: Cipher> {
    store: &'a S,
    cipher: &'a C,
    team: &'a Team,
    prune: BTreeSet<PublicKey>,
}

impl<'a, S: Store, C: Cipher> Reencryptor<'a, S, C> {
    pub fn new(store: &'a S, cipher: &'a C, team: &'a Team) -> Self {
        Self {
            store,
            cipher,
            team,
            prune: BTreeSet::new(),
        }
    }

    /// Also strip these keys from explicit per-secret permissions.
    ///
    /// A revoked member is gone from the team, but an explicit list would
    /// otherwise keep encrypting to their key.
    pub fn prune_keys(mut self, keys: impl IntoIterator<Item = PublicKey>) -> Self {
        self.prune.extend(keys);
        self
    }

    pub fn run(&self, scope: &Scope) -> Result<Stats> {
        let paths = match scope {
            Scope::All => {
                let mut paths = self.store.list(CREDENTIALS_DIR)?;
                paths.extend(self.store.list(PROJECTS_DIR)?);
                paths
            }
            Scope::Credentials => self.store.list(CREDENTIALS_DIR)?,
            Scope::Projects => self.store.list(PROJECTS_DIR)?,
            Scope::Paths(paths) => paths.clone(),
        };

        debug!(files = paths.len(), "re-encrypting");

        let mut stats = Stats::default();
        for path in paths {
            if SecretRef::from_path(&path).is_none() {
                stats.skipped += 1;
                continue;
            }

            stats.total += 1;
            match self.reencrypt_file(&path) {
                Ok(()) => stats.succeeded += 1,
                Err(e) => {
                    warn!(path = %path, error = %e, "re-encryption failed");
                    stats.failed += 1;
                    stats.errors.push(FileError {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            skipped = stats.skipped,
            "re-encryption finished"
        );
        Ok(stats)
    }

    fn reencrypt_file(&self, path: &str) -> Result<()> {
        let ciphertext = self.store.get(path)?;
        let plaintext = self.cipher.decrypt(&ciphertext)?;
        let mut secret = Secret::from_bytes(&plaintext)?;

        let pruned = self.prune_permissions(&mut secret);
        let plaintext = if pruned { secret.to_bytes()? } else { plaintext };

        let operator_key = self.cipher.public_key();
        let recipients = Resolver::new(self.team, &operator_key).resolve(&secret)?;
        let ciphertext = self.cipher.encrypt(&plaintext, &recipients)?;
        self.store.set(path, &ciphertext)?;

        debug!(path, recipients = recipients.len(), pruned, "re-encrypted");
        Ok(())
    }

    /// Returns whether the secret's permissions changed.
    fn prune_permissions(&self, secret: &mut Secret) -> bool {
        let Some(current) = secret.permissions() else {
            return false;
        };
        if self.prune.is_empty() || !current.recipients.iter().any(|r| self.prune.contains(&r.public_key)) {
            return false;
        }

        let mut next = self
            .prune
            .iter()
            .fold(current.clone(), |acc, key| acc.without_key(key));

        if next.is_empty() && !current.use_role_based_access {
            // Keep the list explicit rather than silently widening access.
            let operator_key = self.cipher.public_key();
            let email = self
                .team
                .get_by_key(&operator_key)
                .map(|u| u.email.clone())
                .unwrap_or_else(|| operator_key.clone());
            next = next.with_recipient(&email, &operator_key, AccessLevel::Write);
        }

        secret.set_permissions(Some(next));
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use tempfile::TempDir;

    use super::*;
    use crate::core::cipher::Age;
    use crate::core::domain::{Credential, Role, SecretPermissions, User};
    use crate::core::identity::Identity;
    use crate::core::store::Filesystem;

    fn setup() -> (TempDir, Filesystem, Age, Team) {
        let tmp = TempDir::new().unwrap();
        let store = Filesystem::new(tmp.path());
        let cipher = Age::new(Identity::ephemeral());
        let team = Team::new()
            .with_member(
                User::new("alice@x.io", "", BTreeSet::from([Role::Admin]))
                    .with_key(&cipher.public_key(), false),
            )
            .unwrap();
        (tmp, store, cipher, team)
    }

    fn write(store: &Filesystem, cipher: &Age, secret: &Secret) {
        let ciphertext = cipher.encrypt(&secret.to_bytes().unwrap(), &[]).unwrap();
        store.set(&secret.path(), &ciphertext).unwrap();
    }

    #[test]
    fn test_reencrypt_all_counts() {
        let (_tmp, store, cipher, team) = setup();
        write(
            &store,
            &cipher,
            &Secret::Credential(Credential::new("a.io", "one", "u", "p", "alice@x.io")),
        );
        write(
            &store,
            &cipher,
            &Secret::Credential(Credential::new("b.io", "two", "u", "p", "alice@x.io")),
        );
        store.set("credentials/README", b"not a secret").unwrap();

        let stats = Reencryptor::new(&store, &cipher, &team).run(&Scope::All).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.skipped, 1);
        assert!(stats.is_complete());
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let (_tmp, store, cipher, team) = setup();
        write(
            &store,
            &cipher,
            &Secret::Credential(Credential::new("a.io", "one", "u", "p", "alice@x.io")),
        );
        store.set("credentials/a.io/broken.age", b"garbage").unwrap();
        write(
            &store,
            &cipher,
            &Secret::Credential(Credential::new("z.io", "last", "u", "p", "alice@x.io")),
        );

        let stats = Reencryptor::new(&store, &cipher, &team).run(&Scope::Credentials).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.failed_paths(), vec!["credentials/a.io/broken.age"]);
        assert_eq!(store.get("credentials/a.io/broken.age").unwrap(), b"garbage");
    }

    #[test]
    fn test_paths_scope_missing_file() {
        let (_tmp, store, cipher, team) = setup();
        let stats = Reencryptor::new(&store, &cipher, &team)
            .run(&Scope::Paths(vec!["credentials/x.io/gone.age".to_string()]))
            .unwrap();
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn test_prune_removes_revoked_key() {
        let (_tmp, store, cipher, team) = setup();
        let mut cred = Credential::new("a.io", "one", "u", "p", "alice@x.io");
        cred.permissions = Some(
            SecretPermissions::default()
                .with_recipient("alice@x.io", &cipher.public_key(), AccessLevel::Write)
                .with_recipient("bob@x.io", "age1bobgone", AccessLevel::Read),
        );
        let secret = Secret::Credential(cred);
        // Written with the real key only; the bogus one would fail to parse.
        let ciphertext = cipher.encrypt(&secret.to_bytes().unwrap(), &[]).unwrap();
        store.set(&secret.path(), &ciphertext).unwrap();

        let stats = Reencryptor::new(&store, &cipher, &team)
            .prune_keys(["age1bobgone".to_string()])
            .run(&Scope::All)
            .unwrap();
        assert!(stats.is_complete(), "{:?}", stats.errors);

        let plaintext = cipher.decrypt(&store.get(&secret.path()).unwrap()).unwrap();
        let reread = Secret::from_bytes(&plaintext).unwrap();
        let perms = reread.permissions().unwrap();
        assert!(!perms.has_recipient("bob@x.io"));
        assert!(perms.can_write("alice@x.io"));
    }
}
