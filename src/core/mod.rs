//! Core library components.
//!
//! This module contains the reusable logic: encryption, recipient
//! resolution, re-encryption, key verification, and the [`vault::Vault`]
//! facade that ties them to a store and a team.

pub mod access;
pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod identity;
pub mod kdf;
pub mod reencrypt;
pub mod resolver;
pub mod store;
pub mod types;
pub mod validation;
pub mod vault;
pub mod verification;
