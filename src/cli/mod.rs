//! Command-line interface.

pub mod access;
pub mod completions;
pub mod context;
pub mod cred;
pub mod env;
pub mod init;
pub mod keys;
pub mod output;
pub mod reencrypt;
pub mod team;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::domain::{AccessLevel, Role, Stage};
use crate::error::Result;
use context::Context;

/// Lockbox - a serverless team secret store.
#[derive(Parser)]
#[command(
    name = "lockbox",
    about = "Serverless team secret store with per-secret encryption",
    version
)]
pub struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Store directory (overrides the config file)
    #[arg(long, global = true, env = "LOCKBOX_STORE")]
    pub store: Option<PathBuf>,

    /// Passphrase for a protected private key
    #[arg(long, global = true, env = "LOCKBOX_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create a new store with yourself as its first admin
    Init {
        /// Your email, recorded in the team file
        #[arg(short, long)]
        email: String,
        /// Display name (defaults to your login name)
        #[arg(short, long)]
        name: Option<String>,
        /// Protect a newly generated private key with a passphrase
        #[arg(long)]
        protect: bool,
    },

    /// Generate your private key and print the public key to share
    Keygen {
        /// Your email, as an admin will record it in the team file
        #[arg(short, long)]
        email: Option<String>,
        /// Protect the private key with a passphrase
        #[arg(long)]
        protect: bool,
    },

    /// Show your public key
    Whoami,

    /// Manage the passphrase on your private key
    Passphrase {
        #[command(subcommand)]
        action: PassphraseAction,
    },

    /// Answer a key verification challenge
    Respond {
        /// Encrypted challenge (base64) from the admin
        challenge: String,
    },

    /// Manage team members
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Manage per-secret access
    Access {
        #[command(subcommand)]
        action: AccessAction,
    },

    /// Manage website credentials
    Cred {
        #[command(subcommand)]
        action: CredAction,
    },

    /// Manage per-project environment variables
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },

    /// Re-encrypt secrets for the current team
    Reencrypt {
        /// Which secrets to process
        #[arg(long, value_enum, default_value = "all")]
        scope: ScopeArg,
        /// Only these store paths (e.g. failures from an earlier run)
        #[arg(long = "path")]
        paths: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ScopeArg {
    All,
    Credentials,
    Projects,
}

/// Passphrase subcommands.
#[derive(Subcommand)]
pub enum PassphraseAction {
    /// Protect an unprotected key
    Set,
    /// Change the passphrase
    Change,
    /// Remove protection
    Remove,
}

/// Team subcommands.
#[derive(Subcommand)]
pub enum TeamAction {
    /// List team members
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invite a member, or add roles to an existing one
    Invite {
        email: String,
        /// Roles to grant (repeat or comma-separate)
        #[arg(short, long = "role", value_delimiter = ',', default_value = "dev")]
        roles: Vec<Role>,
        /// The member's age public key
        #[arg(short, long)]
        key: Option<String>,
        /// Trust the key without a verification challenge
        #[arg(long, requires = "key")]
        trust: bool,
        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,
    },

    /// Accept a member's challenge response
    Verify { email: String, response: String },

    /// Issue a new challenge for a pending member
    Reissue { email: String },

    /// List members awaiting verification
    Pending,

    /// Remove a member and re-encrypt everything they could read
    Revoke {
        email: String,
        /// Only update the team; leave existing secrets as they are
        #[arg(long)]
        no_reencrypt: bool,
    },

    /// Add a role to a member
    Grant { email: String, role: Role },

    /// Remove a role from a member
    Ungrant { email: String, role: Role },
}

/// Per-secret access subcommands. Secrets are named `website/name`, or
/// `project/stage` with `--env`.
#[derive(Subcommand)]
pub enum AccessAction {
    /// Show who can open a secret
    List {
        secret: String,
        #[arg(long)]
        env: bool,
    },

    /// Give a member explicit access
    Grant {
        secret: String,
        email: String,
        #[arg(short, long, default_value = "read")]
        level: AccessLevel,
        #[arg(long)]
        env: bool,
    },

    /// Take a member off the explicit list
    Revoke {
        secret: String,
        email: String,
        #[arg(long)]
        env: bool,
    },
}

/// Credential subcommands.
#[derive(Subcommand)]
pub enum CredAction {
    /// Add or replace a credential; the password is prompted or read
    /// from stdin
    Add {
        website: String,
        name: String,
        #[arg(short, long)]
        username: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Show a credential
    Show {
        website: String,
        name: String,
        /// Print the password in the clear
        #[arg(long)]
        reveal: bool,
    },

    /// Remove a credential
    Rm { website: String, name: String },

    /// List credentials
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EnvFormat {
    /// Keys with secret values masked
    Masked,
    /// KEY="value" lines
    Dotenv,
    /// export KEY='value' lines
    Export,
    Json,
}

/// Environment subcommands.
#[derive(Subcommand)]
pub enum EnvAction {
    /// Set a variable (KEY=VALUE)
    Set {
        project: String,
        stage: Stage,
        assignment: String,
        /// Not a secret; shown unmasked
        #[arg(long)]
        plain: bool,
    },

    /// Remove a variable
    Unset {
        project: String,
        stage: Stage,
        key: String,
    },

    /// Show an env file
    Show {
        project: String,
        stage: Stage,
        #[arg(short, long, value_enum, default_value = "masked")]
        format: EnvFormat,
    },

    /// Import variables from a .env file
    Import {
        project: String,
        stage: Stage,
        path: PathBuf,
    },

    /// List env files
    List,
}

/// Run one parsed command.
pub fn execute(cli: Cli) -> Result<()> {
    use Command::*;

    if let Completions { shell } = cli.command {
        return completions::execute(shell);
    }

    let ctx = Context::load(cli.store, cli.passphrase)?;
    match cli.command {
        Init {
            email,
            name,
            protect,
        } => init::execute(&ctx, &email, name, protect),
        Keygen { email, protect } => keys::keygen(&ctx, email.as_deref(), protect),
        Whoami => keys::whoami(&ctx),
        Passphrase { action } => keys::passphrase(&ctx, action),
        Respond { challenge } => keys::respond(&ctx, &challenge),
        Team { action } => team::execute(&ctx, action),
        Access { action } => access::execute(&ctx, action),
        Cred { action } => cred::execute(&ctx, action),
        Env { action } => env::execute(&ctx, action),
        Reencrypt { scope, paths } => reencrypt::execute(&ctx, scope, paths),
        Completions { .. } => Ok(()),
    }
}
