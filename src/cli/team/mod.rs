//! Team management commands.
//!
//! Invite, verify, list and remove team members, and change their roles.

mod invite;
mod list;
mod rm;
mod roles;

use crate::cli::context::Context;
use crate::cli::TeamAction;
use crate::error::Result;

pub use invite::{invite, reissue, verify};
pub use list::{list, pending};
pub use rm::execute as rm;
pub(crate) use rm::report;
pub use roles::{grant, ungrant};

pub fn execute(ctx: &Context, action: TeamAction) -> Result<()> {
    match action {
        TeamAction::List { json } => list(ctx, json),
        TeamAction::Invite {
            email,
            roles,
            key,
            trust,
            name,
        } => invite(ctx, &email, &name, &roles, key, trust),
        TeamAction::Verify { email, response } => verify(ctx, &email, &response),
        TeamAction::Reissue { email } => reissue(ctx, &email),
        TeamAction::Pending => pending(ctx),
        TeamAction::Revoke {
            email,
            no_reencrypt,
        } => rm(ctx, &email, !no_reencrypt),
        TeamAction::Grant { email, role } => grant(ctx, &email, role),
        TeamAction::Ungrant { email, role } => ungrant(ctx, &email, role),
    }
}
