//! Team list and pending commands.

use crate::cli::context::Context;
use crate::cli::output;
use crate::error::Result;

/// List team members.
pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let vault = ctx.open_vault()?;
    let members = vault.members()?;

    if json {
        let result = serde_json::json!({
            "members": members,
            "count": members.len()
        });
        output::data(&serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::blank();
    output::header(&format!("{} team members", output::count(members.len())));
    output::rule();
    for user in &members {
        let roles: Vec<&str> = user.roles.iter().map(|r| r.as_str()).collect();
        let status = match (&user.public_key, user.verification_pending) {
            (None, _) => "no key",
            (Some(_), true) => "pending verification",
            (Some(_), false) => "verified",
        };
        let marker = if user.matches_email(vault.operator()) {
            " (you)"
        } else {
            ""
        };
        output::kv(
            &format!("{}{}", user.email, marker),
            format!("{} [{}]", roles.join(", "), status),
        );
    }
    Ok(())
}

/// List members whose key still awaits verification.
pub fn pending(ctx: &Context) -> Result<()> {
    let vault = ctx.open_vault()?;
    let pending = vault.pending_members()?;

    if pending.is_empty() {
        output::dimmed("no pending members");
        return Ok(());
    }

    output::section("Pending verification");
    for member in &pending {
        let state = match &member.challenge {
            Some(challenge) => format!("expires {}", challenge.expires_at.format("%Y-%m-%d %H:%M UTC")),
            None if member.expired => "challenge expired".to_string(),
            None => "no challenge on this machine".to_string(),
        };
        output::kv(&member.user.email, state);
    }
    if pending.iter().any(|m| m.challenge.is_none()) {
        output::hint(&format!("run: {}", output::cmd("lockbox team reissue <email>")));
    }
    Ok(())
}
