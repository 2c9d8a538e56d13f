//! Team members.
//!
//! The team file is TOML, one `[[member]]` table per user, so that every
//! membership change shows up as a readable diff in the versioned tree.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Role, Roster, Stage};
use crate::core::constants::TEAM_FILE;
use crate::core::types::{Email, PublicKey};
use crate::error::{Result, StoreError, TeamError};

/// A team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Email,
    #[serde(default)]
    pub display_name: String,
    /// `None` until the member has a key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PublicKey>,
    pub roles: BTreeSet<Role>,
    pub created_at: DateTime<Utc>,
    /// Set while a claimed key awaits proof of possession.
    #[serde(default)]
    pub verification_pending: bool,
}

impl User {
    pub fn new(email: &str, display_name: &str, roles: BTreeSet<Role>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            public_key: None,
            roles,
            created_at: Utc::now(),
            verification_pending: false,
        }
    }

    /// A copy holding `public_key`, pending or trusted.
    pub fn with_key(&self, public_key: &str, pending: bool) -> Self {
        let mut user = self.clone();
        user.public_key = Some(public_key.to_string());
        user.verification_pending = pending;
        user
    }

    pub fn with_roles(&self, roles: BTreeSet<Role>) -> Self {
        let mut user = self.clone();
        user.roles = roles;
        user
    }

    /// A copy with the pending flag cleared.
    pub fn verified(&self) -> Self {
        let mut user = self.clone();
        user.verification_pending = false;
        user
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn can_access(&self, stage: Stage) -> bool {
        self.roles.iter().any(|r| r.can_access(stage))
    }

    pub fn can_manage_team(&self) -> bool {
        self.roles.iter().any(Role::can_manage_team)
    }

    pub fn can_write_credentials(&self) -> bool {
        self.roles.iter().any(Role::can_write_credentials)
    }

    pub fn highest_role(&self) -> Option<Role> {
        self.roles.iter().next_back().copied()
    }

    /// The key this member may receive secrets under, if any.
    ///
    /// A pending member's key is never eligible.
    pub fn roster_key(&self) -> Option<&str> {
        if self.verification_pending {
            return None;
        }
        self.public_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn is_roster_eligible(&self) -> bool {
        self.roster_key().is_some()
    }

    pub fn matches_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

/// The full member list. Mutators return a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, rename = "member")]
    members: Vec<User>,
}

impl Team {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| {
            StoreError::Malformed {
                file: TEAM_FILE,
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn render(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            StoreError::Malformed {
                file: TEAM_FILE,
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn members(&self) -> &[User] {
        &self.members
    }

    pub fn get(&self, email: &str) -> Option<&User> {
        self.members.iter().find(|u| u.matches_email(email))
    }

    pub fn require(&self, email: &str) -> Result<&User> {
        self.get(email)
            .ok_or_else(|| TeamError::MemberNotFound(email.to_string()).into())
    }

    pub fn get_by_key(&self, public_key: &str) -> Option<&User> {
        self.members
            .iter()
            .find(|u| u.public_key.as_deref() == Some(public_key))
    }

    pub fn contains(&self, email: &str) -> bool {
        self.get(email).is_some()
    }

    pub fn with_member(&self, user: User) -> Result<Self> {
        if self.contains(&user.email) {
            return Err(TeamError::MemberExists(user.email).into());
        }
        let mut members = self.members.clone();
        members.push(user);
        Ok(Self { members })
    }

    /// Replace the member with the same email.
    pub fn with_updated(&self, user: User) -> Result<Self> {
        if !self.contains(&user.email) {
            return Err(TeamError::MemberNotFound(user.email).into());
        }
        let members = self
            .members
            .iter()
            .map(|u| {
                if u.matches_email(&user.email) {
                    user.clone()
                } else {
                    u.clone()
                }
            })
            .collect();
        Ok(Self { members })
    }

    /// Remove a member, returning the new team and the removed record.
    pub fn without_member(&self, email: &str) -> Result<(Self, User)> {
        let removed = self.require(email)?.clone();
        let members = self
            .members
            .iter()
            .filter(|u| !u.matches_email(email))
            .cloned()
            .collect();
        Ok((Self { members }, removed))
    }

    /// Members holding a trusted key.
    pub fn eligible(&self) -> impl Iterator<Item = &User> {
        self.members.iter().filter(|u| u.is_roster_eligible())
    }

    pub fn pending(&self) -> impl Iterator<Item = &User> {
        self.members.iter().filter(|u| u.verification_pending)
    }

    pub fn admins(&self) -> impl Iterator<Item = &User> {
        self.members.iter().filter(|u| u.is_admin())
    }

    /// The team-wide roster: every eligible member, in team order.
    pub fn roster(&self) -> Roster {
        self.eligible().fold(Roster::new(), |roster, u| match u.roster_key() {
            Some(key) => roster.with(key, Some(u.email.as_str())),
            None => roster,
        })
    }
}
