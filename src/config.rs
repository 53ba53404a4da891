//! Runtime configuration, read once from the environment at startup.
//! Used by: main, issuer.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};

pub const SIGNING_SECRET_VAR: &str = "NEXTAUTH_SECRET";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const API_URL_VAR: &str = "NEXTAUTH_URL";
pub const LOOKUP_TIMEOUT_VAR: &str = "LOOKUP_TIMEOUT_SECS";

const DEFAULT_DATABASE_PATH: &str = "dev.db";
const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct Config {
    pub database_path: String,
    /// Absent until checked by the issuer; missing is an issuance error, not a startup one.
    pub signing_secret: Option<SecretString>,
    pub api_url: String,
    pub lookup_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.into(),
            signing_secret: None,
            api_url: DEFAULT_API_URL.into(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, so tests don't touch process env.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = var(DATABASE_URL_VAR) {
            config.database_path = database_path_from_url(&url);
        }
        config.signing_secret = var(SIGNING_SECRET_VAR)
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        if let Some(url) = var(API_URL_VAR) {
            config.api_url = url;
        }
        if let Some(raw) = var(LOOKUP_TIMEOUT_VAR) {
            config.lookup_timeout = parse_timeout(&raw)?;
        }

        tracing::debug!(
            database = %config.database_path,
            signing_secret_set = config.signing_secret.is_some(),
            lookup_timeout_ms = config.lookup_timeout.as_millis() as u64,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn signing_secret(&self) -> Result<&str> {
        self.signing_secret
            .as_ref()
            .map(|s| s.expose_secret())
            .filter(|s| !s.is_empty())
            .ok_or(Error::MissingSigningSecret)
    }
}

/// Accepts Prisma-style `file:./dev.db` URLs as well as bare paths.
pub fn database_path_from_url(url: &str) -> String {
    url.strip_prefix("file:").unwrap_or(url).to_string()
}

pub fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be whole seconds, got {:?}", LOOKUP_TIMEOUT_VAR, raw)))?;
    if secs == 0 {
        return Err(Error::Config(format!("{} must be at least 1", LOOKUP_TIMEOUT_VAR)));
    }
    Ok(Duration::from_secs(secs))
}
