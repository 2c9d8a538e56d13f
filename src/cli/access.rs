//! Per-secret access commands.

use crate::cli::context::Context;
use crate::cli::output;
use crate::cli::AccessAction;
use crate::core::domain::SecretRef;
use crate::error::{Result, ValidationError};

pub fn execute(ctx: &Context, action: AccessAction) -> Result<()> {
    match action {
        AccessAction::List { secret, env } => {
            let reference = parse_ref(&secret, env)?;
            let vault = ctx.open_vault()?;
            let entries = vault.access_list(&reference)?;

            output::section(&reference.to_string());
            for (email, level) in &entries {
                output::kv(email, level);
            }
            Ok(())
        }
        AccessAction::Grant {
            secret,
            email,
            level,
            env,
        } => {
            let reference = parse_ref(&secret, env)?;
            let vault = ctx.open_vault()?;
            vault.grant_access(&reference, &email, level)?;
            output::success(&format!(
                "{} can now {} {}",
                output::key(&email),
                level,
                reference
            ));
            Ok(())
        }
        AccessAction::Revoke { secret, email, env } => {
            let reference = parse_ref(&secret, env)?;
            let vault = ctx.open_vault()?;
            vault.revoke_access(&reference, &email)?;
            output::success(&format!("removed {} from {}", output::key(&email), reference));
            output::warn("rotate the secret if they have already seen it");
            Ok(())
        }
    }
}

/// `website/name`, or `project/stage` for env files.
pub fn parse_ref(text: &str, env: bool) -> Result<SecretRef> {
    let (first, second) = text
        .split_once('/')
        .ok_or_else(|| ValidationError::InvalidPath(text.to_string()))?;
    if env {
        SecretRef::env(first, second.parse()?)
    } else {
        SecretRef::credential(first, second)
    }
}
