//! Domain types. Pure data, no I/O.

mod pending;
mod permission;
mod role;
mod roster;
mod secret;
mod team;

pub use pending::{PendingList, PendingVerification};
pub use permission::{RecipientPermission, SecretPermissions};
pub use role::{AccessLevel, Role, Stage};
pub use roster::{Roster, RosterEntry};
pub use secret::{parse_dotenv, Audit, Credential, EnvFile, EnvVar, Secret, SecretRef};
pub use team::{Team, User};
