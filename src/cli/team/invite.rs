//! Team invite, verify and reissue commands.

use std::collections::BTreeSet;

use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::domain::{PendingVerification, Role};
use crate::core::vault::KeySource;
use crate::core::verification;
use crate::error::Result;

/// Invite a member, issuing a challenge unless the key is trusted.
pub fn invite(
    ctx: &Context,
    email: &str,
    name: &str,
    roles: &[Role],
    key: Option<String>,
    trust: bool,
) -> Result<()> {
    info!("Inviting {}", email);
    let vault = ctx.open_vault()?;

    let source = match key {
        None => KeySource::Missing,
        Some(key) if trust => KeySource::Trusted(key),
        Some(key) => KeySource::Unverified(key),
    };
    let roles: BTreeSet<Role> = roles.iter().copied().collect();
    let invitation = vault.invite(email, name, roles, source)?;

    output::success(&format!("invited {}", output::key(&invitation.user.email)));
    match &invitation.challenge {
        Some(challenge) => print_challenge(challenge),
        None if invitation.user.public_key.is_none() => {
            output::hint("they need a key: lockbox keygen, then invite again with --key")
        }
        None => output::hint("run: lockbox reencrypt to give them access to existing secrets"),
    }
    Ok(())
}

/// Accept a challenge response.
pub fn verify(ctx: &Context, email: &str, response: &str) -> Result<()> {
    let vault = ctx.open_vault()?;
    let user = vault.verify_member(email, response)?;

    output::success(&format!("verified {}", output::key(&user.email)));
    output::hint("run: lockbox reencrypt to give them access to existing secrets");
    Ok(())
}

/// Issue a fresh challenge.
pub fn reissue(ctx: &Context, email: &str) -> Result<()> {
    let vault = ctx.open_vault()?;
    let challenge = vault.reissue_challenge(email)?;
    output::success(&format!("new challenge for {}", output::key(&challenge.email)));
    print_challenge(&challenge);
    Ok(())
}

fn print_challenge(challenge: &PendingVerification) {
    output::section("Send to the new member");
    output::data(&verification::instructions(
        &challenge.email,
        &challenge.encrypted_challenge,
    ));
}
