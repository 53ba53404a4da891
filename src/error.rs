//! Unified error types for issue-token.
//! Used by: issuer, account, credential, token, config, main.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} is required")]
    MissingInput(&'static str),

    #[error("user not found: {0}")]
    AccountNotFound(String),

    #[error("invalid password")]
    InvalidCredential,

    #[error("NEXTAUTH_SECRET environment variable is required")]
    MissingSigningSecret,

    #[error("account lookup failed: {0}")]
    Lookup(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Label printed in front of operator diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MissingInput(_) => "MissingInput",
            Error::AccountNotFound(_) => "AccountNotFound",
            Error::InvalidCredential => "InvalidCredential",
            Error::MissingSigningSecret => "MissingSigningSecret",
            Error::Lookup(_) => "LookupFailure",
            Error::Signing(_) => "SigningFailure",
            Error::Hashing(_) => "HashingFailure",
            Error::InvalidToken(_) => "InvalidToken",
            Error::Config(_) => "ConfigError",
        }
    }

    /// Caller-facing message: unknown account and wrong password read the same.
    pub fn public_message(&self) -> String {
        match self {
            Error::AccountNotFound(_) | Error::InvalidCredential => "invalid credentials".into(),
            Error::Lookup(_) | Error::Signing(_) | Error::Hashing(_) => "internal error".into(),
            other => other.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Lookup(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Error::Signing(e.to_string())
    }
}

pub fn lock_err<E: std::fmt::Display>(what: &'static str) -> impl Fn(E) -> Error {
    move |e| Error::Lookup(format!("{} lock poisoned: {}", what, e))
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_has_distinct_label() {
        let labels = [
            Error::MissingInput("email").kind(),
            Error::AccountNotFound("a@b.c".into()).kind(),
            Error::InvalidCredential.kind(),
            Error::MissingSigningSecret.kind(),
            Error::Lookup("io".into()).kind(),
            Error::Signing("key".into()).kind(),
            Error::Hashing("cost".into()).kind(),
        ];
        let mut deduped = labels.to_vec();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), labels.len());
    }

    #[test]
    fn not_found_and_bad_password_share_public_message() {
        let not_found = Error::AccountNotFound("ghost@example.com".into());
        assert_eq!(not_found.public_message(), Error::InvalidCredential.public_message());
        assert!(!not_found.public_message().contains("ghost"));
    }

    #[test]
    fn internal_failures_hide_details_publicly() {
        let err = Error::Lookup("disk I/O error at /var/db".into());
        assert_eq!(err.public_message(), "internal error");
    }

    #[test]
    fn every_failure_exits_with_one() {
        assert_eq!(Error::InvalidCredential.exit_code(), 1);
        assert_eq!(Error::MissingSigningSecret.exit_code(), 1);
        assert_eq!(Error::MissingInput("password").exit_code(), 1);
    }

    #[test]
    fn error_messages_are_descriptive() {
        assert_eq!(Error::MissingInput("email").to_string(), "email is required");
        assert_eq!(
            Error::AccountNotFound("ghost@example.com".into()).to_string(),
            "user not found: ghost@example.com"
        );
        assert_eq!(Error::InvalidCredential.to_string(), "invalid password");
    }

    #[test]
    fn sqlite_errors_become_lookup_failures() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert_eq!(err.kind(), "LookupFailure");
    }
}
