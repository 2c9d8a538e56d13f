//! Secret payloads.
//!
//! A secret is serialized to JSON and encrypted as a whole; nothing about
//! it is stored in the clear except its path. Sensitive fields are wiped
//! when the value is dropped.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{SecretPermissions, Stage};
use crate::core::constants::{CREDENTIALS_DIR, PROJECTS_DIR, SECRET_EXT};
use crate::core::types::{Email, SecretBytes, StorePath};
use crate::core::validation::{validate_env_key, validate_segment};
use crate::error::Result;

/// Who created and last changed a secret, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_by: Email,
    pub created_at: DateTime<Utc>,
    pub updated_by: Email,
    pub updated_at: DateTime<Utc>,
}

impl Audit {
    pub fn new(by: &str) -> Self {
        let now = Utc::now();
        Self {
            created_by: by.to_string(),
            created_at: now,
            updated_by: by.to_string(),
            updated_at: now,
        }
    }

    pub fn touched(&self, by: &str) -> Self {
        Self {
            created_by: self.created_by.clone(),
            created_at: self.created_at,
            updated_by: by.to_string(),
            updated_at: Utc::now(),
        }
    }
}

/// Website login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    #[zeroize(skip)]
    pub website: String,
    #[zeroize(skip)]
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[zeroize(skip)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub permissions: Option<SecretPermissions>,
    #[serde(flatten)]
    #[zeroize(skip)]
    pub audit: Audit,
}

impl Credential {
    pub fn new(website: &str, name: &str, username: &str, password: &str, by: &str) -> Self {
        Self {
            website: website.to_string(),
            name: name.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            url: None,
            notes: None,
            tags: Vec::new(),
            permissions: None,
            audit: Audit::new(by),
        }
    }

    pub fn reference(&self) -> SecretRef {
        SecretRef::Credential {
            website: self.website.clone(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("website", &self.website)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tags", &self.tags)
            .finish()
    }
}

/// One environment variable.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct EnvVar {
    #[zeroize(skip)]
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub description: Option<String>,
    /// Masked on display.
    #[serde(default = "default_true")]
    #[zeroize(skip)]
    pub is_secret: bool,
}

fn default_true() -> bool {
    true
}

impl EnvVar {
    pub fn new(key: &str, value: &str, is_secret: bool) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            description: None,
            is_secret,
        }
    }
}

impl fmt::Debug for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value: &dyn fmt::Debug = if self.is_secret {
            &"<redacted>"
        } else {
            &self.value
        };
        f.debug_struct("EnvVar")
            .field("key", &self.key)
            .field("value", value)
            .field("is_secret", &self.is_secret)
            .finish()
    }
}

/// All variables of one project at one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvFile {
    pub project: String,
    pub stage: Stage,
    #[serde(default)]
    pub vars: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<SecretPermissions>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl EnvFile {
    pub fn new(project: &str, stage: Stage, by: &str) -> Self {
        Self {
            project: project.to_string(),
            stage,
            vars: Vec::new(),
            permissions: None,
            audit: Audit::new(by),
        }
    }

    pub fn reference(&self) -> SecretRef {
        SecretRef::Env {
            project: self.project.clone(),
            stage: self.stage,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|v| v.key == key)
            .map(|v| v.value.as_str())
    }

    /// Add or replace a variable, keeping its position if it exists.
    pub fn set(&mut self, key: &str, value: &str, is_secret: bool) -> Result<()> {
        validate_env_key(key)?;
        match self.vars.iter_mut().find(|v| v.key == key) {
            Some(var) => {
                var.value.zeroize();
                var.value = value.to_string();
                var.is_secret = is_secret;
            }
            None => self.vars.push(EnvVar::new(key, value, is_secret)),
        }
        Ok(())
    }

    /// Remove a variable. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        let before = self.vars.len();
        self.vars.retain(|v| v.key != key);
        self.vars.len() != before
    }

    /// `KEY="value"` lines; `\`, `"` and newlines are escaped.
    pub fn to_dotenv(&self) -> Zeroizing<String> {
        let mut out = Zeroizing::new(String::new());
        for var in &self.vars {
            out.push_str(&var.key);
            out.push_str("=\"");
            for ch in var.value.chars() {
                match ch {
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    _ => out.push(ch),
                }
            }
            out.push_str("\"\n");
        }
        out
    }

    /// `export KEY='value'` lines for a POSIX shell.
    pub fn to_export(&self) -> Zeroizing<String> {
        let mut out = Zeroizing::new(String::new());
        for var in &self.vars {
            let value = Zeroizing::new(var.value.replace('\'', "'\"'\"'"));
            out.push_str("export ");
            out.push_str(&var.key);
            out.push_str("='");
            out.push_str(&value);
            out.push_str("'\n");
        }
        out
    }

    pub fn to_map(&self) -> BTreeMap<String, Zeroizing<String>> {
        self.vars
            .iter()
            .map(|v| (v.key.clone(), Zeroizing::new(v.value.clone())))
            .collect()
    }
}

/// Parse `.env` content. Blank lines, comments and lines without `=`
/// are skipped; matching surrounding quotes are stripped. Every parsed
/// variable is marked secret.
pub fn parse_dotenv(content: &str) -> Vec<EnvVar> {
    let mut vars = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let value = value.trim();
        let value = if let Some(inner) = quoted(value, '"') {
            unescape(inner)
        } else {
            Zeroizing::new(quoted(value, '\'').unwrap_or(value).to_string())
        };
        vars.push(EnvVar::new(key, &value, true));
    }
    vars
}

fn quoted(value: &str, quote: char) -> Option<&str> {
    value.strip_prefix(quote)?.strip_suffix(quote)
}

/// Undo the escapes written by [`EnvFile::to_dotenv`]. Unknown escapes
/// are kept verbatim.
fn unescape(value: &str) -> Zeroizing<String> {
    let mut out = Zeroizing::new(String::with_capacity(value.len()));
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(c @ ('\\' | '"')) => out.push(c),
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Any encrypted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Secret {
    Credential(Credential),
    Env(EnvFile),
}

impl Secret {
    pub fn reference(&self) -> SecretRef {
        match self {
            Secret::Credential(c) => c.reference(),
            Secret::Env(e) => e.reference(),
        }
    }

    pub fn path(&self) -> StorePath {
        self.reference().path()
    }

    pub fn permissions(&self) -> Option<&SecretPermissions> {
        match self {
            Secret::Credential(c) => c.permissions.as_ref(),
            Secret::Env(e) => e.permissions.as_ref(),
        }
    }

    pub fn set_permissions(&mut self, permissions: Option<SecretPermissions>) {
        match self {
            Secret::Credential(c) => c.permissions = permissions,
            Secret::Env(e) => e.permissions = permissions,
        }
    }

    pub fn audit(&self) -> &Audit {
        match self {
            Secret::Credential(c) => &c.audit,
            Secret::Env(e) => &e.audit,
        }
    }

    pub fn touch(&mut self, by: &str) {
        match self {
            Secret::Credential(c) => c.audit = c.audit.touched(by),
            Secret::Env(e) => e.audit = e.audit.touched(by),
        }
    }

    /// Serialized plaintext, ready to encrypt.
    pub fn to_bytes(&self) -> Result<SecretBytes> {
        Ok(Zeroizing::new(serde_json::to_vec(self)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Logical address of a secret, independent of its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SecretRef {
    Credential { website: String, name: String },
    Env { project: String, stage: Stage },
}

impl SecretRef {
    pub fn credential(website: &str, name: &str) -> Result<Self> {
        validate_segment("website", website)?;
        validate_segment("name", name)?;
        Ok(SecretRef::Credential {
            website: website.to_string(),
            name: name.to_string(),
        })
    }

    pub fn env(project: &str, stage: Stage) -> Result<Self> {
        validate_segment("project", project)?;
        Ok(SecretRef::Env {
            project: project.to_string(),
            stage,
        })
    }

    /// Store path, e.g. `credentials/github.com/bot.age` or
    /// `projects/web/prod.env.age`.
    pub fn path(&self) -> StorePath {
        match self {
            SecretRef::Credential { website, name } => {
                format!("{}/{}/{}{}", CREDENTIALS_DIR, website, name, SECRET_EXT)
            }
            SecretRef::Env { project, stage } => {
                format!("{}/{}/{}.env{}", PROJECTS_DIR, project, stage, SECRET_EXT)
            }
        }
    }

    /// Inverse of [`SecretRef::path`]. `None` for anything that is not a
    /// secret path.
    pub fn from_path(path: &str) -> Option<Self> {
        let stem = path.strip_suffix(SECRET_EXT)?;
        let mut parts = stem.split('/');
        let (root, first, second) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        match root {
            CREDENTIALS_DIR => SecretRef::credential(first, second).ok(),
            PROJECTS_DIR => {
                let stage = second.strip_suffix(".env")?.parse().ok()?;
                SecretRef::env(first, stage).ok()
            }
            _ => None,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            SecretRef::Credential { .. } => None,
            SecretRef::Env { stage, .. } => Some(*stage),
        }
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretRef::Credential { website, name } => write!(f, "{}/{}", website, name),
            SecretRef::Env { project, stage } => write!(f, "{}/{}", project, stage),
        }
    }
}
