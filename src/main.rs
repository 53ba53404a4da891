//! issue-token: verify an account's password and mint a NextAuth-compatible session JWT.
//! Used by: binary entrypoint.

pub mod account;
pub mod config;
pub mod console;
pub mod credential;
pub mod error;
pub mod issuer;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use secrecy::{ExposeSecret, SecretString};
use tracing_subscriber::EnvFilter;

use crate::account::sqlite::AccountStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::issuer::{IssuedToken, TokenIssuer};
use crate::token::claims::Claims;

#[derive(Parser)]
#[command(name = "issue-token")]
#[command(about = "Verify an account's password and print a signed NextAuth session token")]
struct Args {
    /// Account email
    email: Option<String>,

    /// Account password
    password: Option<String>,

    /// SQLite database path (overrides DATABASE_URL)
    #[arg(long)]
    database: Option<String>,

    /// Base URL used in the printed usage example (overrides NEXTAUTH_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Seconds to wait for the account lookup (overrides LOOKUP_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    lookup_timeout: Option<u64>,

    /// Verify an existing token against NEXTAUTH_SECRET instead of issuing one
    #[arg(long, value_name = "TOKEN", conflicts_with_all = ["email", "password", "hash"])]
    verify: Option<String>,

    /// Print a bcrypt hash of the given password, for seeding accounts
    #[arg(long, value_name = "PASSWORD", conflicts_with_all = ["email", "password"])]
    hash: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("issue_token=warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

/// What a successful run produced. Printed only once the run has succeeded,
/// so a failing run leaves stdout empty.
#[derive(Debug)]
enum Outcome {
    Issued { issued: IssuedToken, api_url: String },
    Verified(Claims),
    Hashed(String),
}

impl Outcome {
    fn print(&self) {
        match self {
            Outcome::Issued { issued, api_url } => console::print_issued(issued, api_url),
            Outcome::Verified(claims) => console::print_claims(claims),
            Outcome::Hashed(hash) => console::print_hash(hash),
        }
    }
}

fn load_config<F>(args: &Args, var: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = Config::from_vars(var)?;
    if let Some(path) = &args.database {
        config.database_path = config::database_path_from_url(path);
    }
    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    if let Some(secs) = args.lookup_timeout {
        config.lookup_timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

async fn run<F>(args: Args, var: F) -> Result<Outcome>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(password) = &args.hash {
        let hash = credential::hash_secret(password, credential::DEFAULT_BCRYPT_COST)?;
        return Ok(Outcome::Hashed(hash));
    }

    if let Some(token) = &args.verify {
        let config = load_config(&args, var)?;
        let claims = token::verify::verify_token(token, config.signing_secret()?)?;
        return Ok(Outcome::Verified(claims));
    }

    // Input is rejected before configuration or the database are touched.
    let email = args.email.clone().unwrap_or_default();
    let password = SecretString::from(args.password.clone().unwrap_or_default());
    if email.is_empty() {
        return Err(Error::MissingInput("email"));
    }
    if password.expose_secret().is_empty() {
        return Err(Error::MissingInput("password"));
    }

    let config = load_config(&args, var)?;

    tracing::info!(database = %config.database_path, "generating NextAuth JWT token");
    let store = AccountStore::open(&config.database_path)?;
    let issuer = TokenIssuer::new(config, Arc::new(store));

    let issued = issuer.issue_token(&email, &password).await?;
    Ok(Outcome::Issued {
        issued,
        api_url: issuer.config().api_url.clone(),
    })
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Args::parse();
    match run(args, |key| std::env::var(key).ok()).await {
        Ok(outcome) => outcome.print(),
        Err(e) => {
            console::print_error(&e);
            std::process::exit(e.exit_code());
        }
    }
}
