use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::{auth::jwt::JwtKeys, config::JwtConfig};

#[derive(Debug, Parser)]
#[command(name = "product-api")]
#[command(about = "Product catalogue HTTP API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Print a bearer token signed with JWT_SECRET")]
    IssueToken {
        /// Caller identity written to the `sub` claim
        subject: String,

        /// Token lifetime in minutes
        #[arg(default_value_t = 60)]
        ttl_minutes: u64,
    },
}

impl Cli {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}

/// Signs a token from the JWT settings alone; no store settings are needed.
pub fn issue_token(jwt: Option<JwtConfig>, subject: &str, ttl_minutes: u64) -> anyhow::Result<String> {
    let jwt = jwt.ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set to issue tokens"))?;
    JwtKeys::new(&jwt).sign(subject, Duration::from_secs(ttl_minutes.saturating_mul(60)))
}
