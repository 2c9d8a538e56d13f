//! Team-wide recipients roster.
//!
//! Text format, one recipient per line:
//!
//! ```text
//! # lockbox recipients - verified team members
//! # Format: <age-public-key> # <email>
//!
//! age1qyqszqgpqyqszqgpqyqszqgpqyqszqgpqyqszqgpqyqszqgpqyqs3ryytp # alice@example.com
//! ```
//!
//! Reading is lenient: the file is operator-editable, so lines whose key
//! does not carry the `age1` prefix are skipped rather than rejected.
//! Writing always produces the canonical form.

use crate::core::constants::{PUBLIC_KEY_PREFIX, RECIPIENTS_HEADER};
use crate::core::types::{Email, PublicKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub public_key: PublicKey,
    pub email: Option<Email>,
}

/// Ordered `(public key, email)` list. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse roster text. Never fails; unrecognized lines are skipped and
    /// a repeated key keeps its first position.
    pub fn parse(text: &str) -> Self {
        let mut roster = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, email) = match line.split_once('#') {
                Some((key, email)) => (key.trim(), Some(email.trim())),
                None => (line, None),
            };
            if !key.starts_with(PUBLIC_KEY_PREFIX) {
                continue;
            }
            roster = roster.with(key, email.filter(|e| !e.is_empty()));
        }
        roster
    }

    /// Canonical text form.
    pub fn render(&self) -> String {
        let mut out = String::from(RECIPIENTS_HEADER);
        out.push('\n');
        for entry in &self.entries {
            match &entry.email {
                Some(email) => {
                    out.push_str(&entry.public_key);
                    out.push_str(" # ");
                    out.push_str(email);
                }
                None => out.push_str(&entry.public_key),
            }
            out.push('\n');
        }
        out
    }

    /// Add a key. An existing key keeps its position; a given email
    /// replaces the stored one.
    pub fn with(&self, public_key: &str, email: Option<&str>) -> Self {
        let mut entries = self.entries.clone();
        match entries.iter_mut().find(|e| e.public_key == public_key) {
            Some(existing) => {
                if let Some(email) = email {
                    existing.email = Some(email.to_string());
                }
            }
            None => entries.push(RosterEntry {
                public_key: public_key.to_string(),
                email: email.map(str::to_string),
            }),
        }
        Self { entries }
    }

    pub fn without_key(&self, public_key: &str) -> Self {
        self.filter(|e| e.public_key != public_key)
    }

    /// Remove every entry whose email matches, ignoring ASCII case.
    pub fn without_email(&self, email: &str) -> Self {
        self.filter(|e| {
            !e.email
                .as_deref()
                .is_some_and(|em| em.eq_ignore_ascii_case(email))
        })
    }

    pub fn has(&self, public_key: &str) -> bool {
        self.entries.iter().any(|e| e.public_key == public_key)
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.key_for(email).is_some()
    }

    pub fn email_for(&self, public_key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.public_key == public_key)
            .and_then(|e| e.email.as_deref())
    }

    pub fn key_for(&self, email: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| {
                e.email
                    .as_deref()
                    .is_some_and(|em| em.eq_ignore_ascii_case(email))
            })
            .map(|e| e.public_key.as_str())
    }

    /// Union with `other`; entries already present win their position.
    pub fn merge(&self, other: &Roster) -> Self {
        other.entries.iter().fold(self.clone(), |acc, e| {
            acc.with(&e.public_key, e.email.as_deref())
        })
    }

    /// Sorted by email, entries without one last.
    pub fn sorted(&self) -> Self {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| match (&a.email, &b.email) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.public_key.cmp(&b.public_key),
        });
        Self { entries }
    }

    pub fn filter(&self, keep: impl Fn(&RosterEntry) -> bool) -> Self {
        Self {
            entries: self.entries.iter().filter(|e| keep(*e)).cloned().collect(),
        }
    }

    pub fn keys(&self) -> Vec<PublicKey> {
        self.entries.iter().map(|e| e.public_key.clone()).collect()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
