//! Test support utilities for lockbox integration tests.
//!
//! Provides isolated environments for driving the binary and for
//! exercising the library against a real on-disk store.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod library;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use library::Shared;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with one shared store and a separate home per user.
///
/// Child processes get their own `HOME`, so config, keys and local state
/// never leak between users or tests. Nothing process-global is mutated
/// and tests can run in parallel.
pub struct Test {
    pub root: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let root = TempDir::new().expect("failed to create temp dir");
        Self { root }
    }

    /// A store initialized by Alice.
    pub fn init() -> Self {
        let t = Self::new();
        let output = t.init_as(ALICE, ALICE_EMAIL);
        assert!(
            output.status.success(),
            "Failed to initialize store: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }

    /// The shared store every user points at.
    pub fn store(&self) -> PathBuf {
        self.root.path().join("store")
    }

    /// A user's home directory.
    pub fn home(&self, user: &str) -> PathBuf {
        self.root.path().join("home").join(user)
    }
}
