//! Team role commands.

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::domain::Role;
use crate::error::Result;

pub fn grant(ctx: &Context, email: &str, role: Role) -> Result<()> {
    let vault = ctx.open_vault()?;
    let user = vault.grant_role(email, role)?;
    output::success(&format!("{} is now {}", output::key(&user.email), role));
    output::hint("run: lockbox reencrypt so env files follow the new role");
    Ok(())
}

pub fn ungrant(ctx: &Context, email: &str, role: Role) -> Result<()> {
    let vault = ctx.open_vault()?;
    let user = vault.ungrant_role(email, role)?;
    output::success(&format!("{} is no longer {}", output::key(&user.email), role));
    output::hint("run: lockbox reencrypt so env files follow the new role");
    Ok(())
}
