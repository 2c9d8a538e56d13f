//! CLI integration tests.

mod support;

#[path = "cli/access.rs"]
mod access;
#[path = "cli/cred.rs"]
mod cred;
#[path = "cli/env.rs"]
mod env;
#[path = "cli/errors.rs"]
mod errors;
#[path = "cli/init.rs"]
mod init;
#[path = "cli/keys.rs"]
mod keys;
