//! Roles, stages and access levels.
//!
//! All three are closed enums; every capability question is an exhaustive
//! match so adding a variant forces every decision to be revisited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Deployment stage an env file belongs to. Ordered `dev < staging < prod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Dev,
    Staging,
    Prod,
}

impl Stage {
    pub const fn all() -> [Stage; 3] {
        [Stage::Dev, Stage::Staging, Stage::Prod]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Dev => "dev",
            Stage::Staging => "staging",
            Stage::Prod => "prod",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Stage::Dev),
            "staging" => Ok(Stage::Staging),
            "prod" => Ok(Stage::Prod),
            _ => Err(ValidationError::InvalidStage(s.to_string())),
        }
    }
}

/// Team role. Ordered by capability: `dev < staging-access < prod-access < admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Dev,
    StagingAccess,
    ProdAccess,
    Admin,
}

impl Role {
    /// Every role, lowest capability first.
    pub const fn all() -> [Role; 4] {
        [Role::Dev, Role::StagingAccess, Role::ProdAccess, Role::Admin]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Dev => "dev",
            Role::StagingAccess => "staging-access",
            Role::ProdAccess => "prod-access",
            Role::Admin => "admin",
        }
    }

    /// Whether this role may decrypt env files of `stage`.
    pub fn can_access(&self, stage: Stage) -> bool {
        match (self, stage) {
            (Role::Admin | Role::ProdAccess, _) => true,
            (Role::StagingAccess, Stage::Dev | Stage::Staging) => true,
            (Role::StagingAccess, Stage::Prod) => false,
            (Role::Dev, Stage::Dev) => true,
            (Role::Dev, Stage::Staging | Stage::Prod) => false,
        }
    }

    /// Invite, revoke and change roles of members.
    pub fn can_manage_team(&self) -> bool {
        match self {
            Role::Admin => true,
            Role::ProdAccess | Role::StagingAccess | Role::Dev => false,
        }
    }

    /// Create and modify credentials.
    pub fn can_write_credentials(&self) -> bool {
        match self {
            Role::Admin | Role::ProdAccess => true,
            Role::StagingAccess | Role::Dev => false,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Dev => "dev environment only",
            Role::StagingAccess => "dev and staging environments",
            Role::ProdAccess => "all environments, may edit credentials",
            Role::Admin => "full access and team management",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Role::Dev),
            "staging-access" => Ok(Role::StagingAccess),
            "prod-access" => Ok(Role::ProdAccess),
            "admin" => Ok(Role::Admin),
            _ => Err(ValidationError::InvalidRole(s.to_string())),
        }
    }
}

/// Per-secret access level. Both levels decrypt; only `Write` may modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Read,
    Write,
}

impl AccessLevel {
    pub fn can_write(&self) -> bool {
        match self {
            AccessLevel::Write => true,
            AccessLevel::Read => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Read => "read",
            AccessLevel::Write => "write",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(AccessLevel::Read),
            "write" => Ok(AccessLevel::Write),
            _ => Err(ValidationError::InvalidAccessLevel(s.to_string())),
        }
    }
}
