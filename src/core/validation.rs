//! Input validation.
//!
//! Every check here runs before any I/O, so a rejected input never leaves
//! a partial change behind.

use crate::core::cipher::parse_recipient;
use crate::error::{Result, ValidationError};

const MAX_SEGMENT_LEN: usize = 128;

/// Reject an empty (or all-whitespace) required field.
pub fn validate_required(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field).into());
    }
    Ok(())
}

/// Validate and normalize an email address (trimmed, lowercased).
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim();
    validate_required("email", email)?;

    let invalid = || ValidationError::InvalidEmail(email.to_string());
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(|c| c.is_whitespace() || c.is_control() || c == '#')
    {
        return Err(invalid().into());
    }

    Ok(email.to_ascii_lowercase())
}

/// Validate a name that becomes one path segment in the store
/// (website, credential name, project).
pub fn validate_segment(field: &'static str, value: &str) -> Result<()> {
    validate_required(field, value)?;

    let reason = if value.len() > MAX_SEGMENT_LEN {
        Some(format!("longer than {} bytes", MAX_SEGMENT_LEN))
    } else if value.starts_with('.') {
        Some("cannot start with '.'".to_string())
    } else if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '/' | '\\' | ':') || c.is_control() || c.is_whitespace())
    {
        Some(format!("invalid character {:?}", c))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::InvalidName {
            field,
            value: value.to_string(),
            reason,
        }
        .into()),
        None => Ok(()),
    }
}

/// Validate an environment variable name.
///
/// Only A-Z, a-z, 0-9 and underscore, not starting with a digit.
pub fn validate_env_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(ValidationError::EmptyField("variable name").into());
    }

    if key.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidName {
            field: "variable",
            value: key.to_string(),
            reason: "cannot start with a digit".to_string(),
        }
        .into());
    }

    if let Some((i, ch)) = key
        .chars()
        .enumerate()
        .find(|(_, ch)| !ch.is_ascii_alphanumeric() && *ch != '_')
    {
        return Err(ValidationError::InvalidName {
            field: "variable",
            value: key.to_string(),
            reason: format!(
                "invalid character '{}' at position {}. Only letters, digits and underscore are allowed",
                ch,
                i + 1
            ),
        }
        .into());
    }

    Ok(())
}

/// Validate an age public key.
pub fn validate_public_key(key: &str) -> Result<()> {
    validate_required("public key", key)?;
    parse_recipient(key).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_env_keys() {
        assert!(validate_env_key("DATABASE_URL").is_ok());
        assert!(validate_env_key("_PRIVATE").is_ok());
        assert!(validate_env_key("api_key2").is_ok());
    }

    #[test]
    fn test_invalid_env_keys() {
        assert!(validate_env_key("").is_err());
        assert!(validate_env_key("123_KEY").is_err());
        assert!(validate_env_key("API-KEY").is_err());
        assert!(validate_env_key("API KEY").is_err());
    }

    #[test]
    fn test_emails() {
        assert_eq!(normalize_email(" Alice@Example.COM ").unwrap(), "alice@example.com");
        for bad in ["", "alice", "@x.io", "a@", "a@b", "a@@x.io", "a b@x.io", "a#b@x.io", "a@.io"] {
            assert!(normalize_email(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_segments() {
        assert!(validate_segment("website", "github.com").is_ok());
        assert!(validate_segment("name", "team-bot_2").is_ok());
        for bad in ["", "..", ".hidden", "a/b", "a\\b", "with space", "a:b"] {
            assert!(validate_segment("name", bad).is_err(), "{bad}");
        }
        assert!(validate_segment("name", &"x".repeat(200)).is_err());
    }

    #[test]
    fn test_public_key() {
        assert!(validate_public_key("").is_err());
        assert!(validate_public_key("age1nope").is_err());
    }
}
