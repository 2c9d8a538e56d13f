//! Storage for the versioned secret tree.
//!
//! The tree itself (commit, push, pull, conflict handling) is managed
//! outside lockbox; the core only needs per-file atomic get/set/delete,
//! prefix listing and existence checks. All paths are store-relative and
//! use `/` as separator.

use crate::core::types::StorePath;
use crate::error::Result;

mod fs;

pub use fs::Filesystem;
pub(crate) use fs::{validate_file_permissions, write_atomic};

/// Storage trait.
///
/// Implementations must make `set` atomic: a reader sees either the old
/// content or the new content, never a partial write.
pub trait Store {
    /// Read a file.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the path does not exist.
    fn get(&self, path: &str) -> Result<Vec<u8>>;

    /// Create or replace a file.
    fn set(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Remove a file.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the path does not exist.
    fn delete(&self, path: &str) -> Result<()>;

    /// Every file under `prefix` (recursively), sorted. An empty prefix
    /// lists the whole tree. A missing prefix yields an empty list.
    fn list(&self, prefix: &str) -> Result<Vec<StorePath>>;

    fn exists(&self, path: &str) -> bool;
}

impl<S: Store + ?Sized> Store for &S {
    fn get(&self, path: &str) -> Result<Vec<u8>> {
        (**self).get(path)
    }

    fn set(&self, path: &str, data: &[u8]) -> Result<()> {
        (**self).set(path, data)
    }

    fn delete(&self, path: &str) -> Result<()> {
        (**self).delete(path)
    }

    fn list(&self, prefix: &str) -> Result<Vec<StorePath>> {
        (**self).list(prefix)
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }
}
