//! Credential check and session token issuance.
//! Used by: main.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::account::{AccountLookup, AccountRecord};
use crate::config::Config;
use crate::credential::{BcryptVerifier, SecretVerifier};
use crate::error::{Error, Result};
use crate::token::claims::Claims;
use crate::token::sign::sign_token;

#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub email: String,
    pub account_id: String,
    pub expires_at: DateTime<Utc>,
    pub claims: Claims,
}

pub struct TokenIssuer {
    config: Config,
    lookup: Arc<dyn AccountLookup>,
    verifier: Box<dyn SecretVerifier>,
}

impl TokenIssuer {
    pub fn new(config: Config, lookup: Arc<dyn AccountLookup>) -> Self {
        Self::with_verifier(config, lookup, Box::new(BcryptVerifier))
    }

    pub fn with_verifier(
        config: Config,
        lookup: Arc<dyn AccountLookup>,
        verifier: Box<dyn SecretVerifier>,
    ) -> Self {
        Self {
            config,
            lookup,
            verifier,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Verifies `password` against the stored hash for `email` and signs a
    /// 7-day session token. Every failure is terminal; nothing is retried.
    pub async fn issue_token(&self, email: &str, password: &SecretString) -> Result<IssuedToken> {
        if email.is_empty() {
            return Err(Error::MissingInput("email"));
        }
        if password.expose_secret().is_empty() {
            return Err(Error::MissingInput("password"));
        }

        let account = self
            .find_account(email)
            .await?
            .ok_or_else(|| Error::AccountNotFound(email.to_owned()))?;

        if !self.verifier.verify(password.expose_secret(), &account.password_hash) {
            tracing::debug!(sub = %account.id, "password rejected");
            return Err(Error::InvalidCredential);
        }

        let secret = self.config.signing_secret()?;

        let issued_at = Utc::now();
        let claims = Claims::new(&account, issued_at);
        let token = sign_token(&claims, secret)?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| Error::Signing(format!("expiry out of range: {}", claims.exp)))?;

        tracing::info!(sub = %claims.sub, jti = %claims.jti, exp = claims.exp, "token issued");
        Ok(IssuedToken {
            token,
            email: account.email,
            account_id: account.id,
            expires_at,
            claims,
        })
    }

    async fn find_account(&self, email: &str) -> Result<Option<AccountRecord>> {
        let lookup = Arc::clone(&self.lookup);
        let email = email.to_owned();
        let task = tokio::task::spawn_blocking(move || lookup.find_by_email(&email));

        match tokio::time::timeout(self.config.lookup_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(Error::Lookup(format!("lookup task failed: {}", e))),
            Err(_) => Err(Error::Lookup(format!(
                "timed out after {}ms",
                self.config.lookup_timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::account::sqlite::AccountStore;
    use crate::credential::hash_secret;
    use crate::token::verify::verify_token;

    const SIGNING_SECRET: &str = "test-signing-secret";

    fn config() -> Config {
        Config {
            signing_secret: Some(SecretString::from(SIGNING_SECRET)),
            ..Config::default()
        }
    }

    fn pw(s: &str) -> SecretString {
        SecretString::from(s)
    }

    fn seeded_store() -> Result<Arc<AccountStore>> {
        let store = AccountStore::open_in_memory()?;
        store.insert_account(&AccountRecord {
            id: "1".into(),
            email: "alice@example.com".into(),
            name: None,
            password_hash: hash_secret("correct-pw", 4)?,
        })?;
        Ok(Arc::new(store))
    }

    fn issuer() -> Result<TokenIssuer> {
        Ok(TokenIssuer::new(config(), seeded_store()?))
    }

    struct CountingLookup {
        calls: AtomicUsize,
    }

    impl AccountLookup for CountingLookup {
        fn find_by_email(&self, _email: &str) -> Result<Option<AccountRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    struct SlowLookup;

    impl AccountLookup for SlowLookup {
        fn find_by_email(&self, _email: &str) -> Result<Option<AccountRecord>> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(None)
        }
    }

    struct BrokenLookup;

    impl AccountLookup for BrokenLookup {
        fn find_by_email(&self, _email: &str) -> Result<Option<AccountRecord>> {
            Err(Error::Lookup("database is locked".into()))
        }
    }

    #[tokio::test]
    async fn issues_token_for_valid_credentials() -> Result<()> {
        let issued = issuer()?.issue_token("alice@example.com", &pw("correct-pw")).await?;
        assert_eq!(issued.token.split('.').count(), 3);
        assert_eq!(issued.account_id, "1");
        assert_eq!(issued.email, "alice@example.com");
        assert_eq!(issued.claims.sub, "1");
        assert_eq!(issued.claims.email, "alice@example.com");
        assert_eq!(issued.claims.name, "alice");
        assert_eq!(issued.claims.exp, issued.claims.iat + 604_800);
        assert_eq!(issued.expires_at.timestamp(), issued.claims.exp);
        Ok(())
    }

    #[tokio::test]
    async fn issued_token_round_trips_through_verifier() -> Result<()> {
        let issued = issuer()?.issue_token("alice@example.com", &pw("correct-pw")).await?;
        let verified = verify_token(&issued.token, SIGNING_SECRET)?;
        assert_eq!(verified, issued.claims);
        assert!(matches!(
            verify_token(&issued.token, "some-other-secret"),
            Err(Error::InvalidToken(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn missing_input_skips_lookup() {
        let lookup = Arc::new(CountingLookup {
            calls: AtomicUsize::new(0),
        });
        let issuer = TokenIssuer::new(config(), lookup.clone());

        let no_email = issuer.issue_token("", &pw("correct-pw")).await;
        assert!(matches!(no_email, Err(Error::MissingInput("email"))));
        let no_password = issuer.issue_token("alice@example.com", &pw("")).await;
        assert!(matches!(no_password, Err(Error::MissingInput("password"))));

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_account_not_found() -> Result<()> {
        let result = issuer()?.issue_token("ghost@example.com", &pw("correct-pw")).await;
        assert!(matches!(result, Err(Error::AccountNotFound(ref e)) if e == "ghost@example.com"));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credential() -> Result<()> {
        let result = issuer()?.issue_token("alice@example.com", &pw("wrong-pw")).await;
        assert!(matches!(result, Err(Error::InvalidCredential)));
        Ok(())
    }

    #[tokio::test]
    async fn missing_signing_secret_checked_after_credentials() -> Result<()> {
        let issuer = TokenIssuer::new(Config::default(), seeded_store()?);

        let ok_creds = issuer.issue_token("alice@example.com", &pw("correct-pw")).await;
        assert!(matches!(ok_creds, Err(Error::MissingSigningSecret)));

        // Credential errors take precedence over configuration errors.
        let bad_creds = issuer.issue_token("alice@example.com", &pw("wrong-pw")).await;
        assert!(matches!(bad_creds, Err(Error::InvalidCredential)));
        Ok(())
    }

    #[tokio::test]
    async fn successive_calls_get_distinct_token_ids() -> Result<()> {
        let issuer = issuer()?;
        let first = issuer.issue_token("alice@example.com", &pw("correct-pw")).await?;
        tokio::time::sleep(Duration::from_millis(1100)).await;
        let second = issuer.issue_token("alice@example.com", &pw("correct-pw")).await?;

        assert_ne!(first.claims.jti, second.claims.jti);
        assert_ne!(first.claims.iat, second.claims.iat);
        assert_ne!(first.claims.exp, second.claims.exp);
        assert_ne!(first.token, second.token);
        Ok(())
    }

    #[tokio::test]
    async fn slow_lookup_times_out() {
        let config = Config {
            lookup_timeout: Duration::from_millis(50),
            ..config()
        };
        let issuer = TokenIssuer::new(config, Arc::new(SlowLookup));
        let result = issuer.issue_token("alice@example.com", &pw("correct-pw")).await;
        assert!(matches!(result, Err(Error::Lookup(ref m)) if m.contains("timed out")));
    }

    #[tokio::test]
    async fn persistence_error_is_lookup_failure() {
        let issuer = TokenIssuer::new(config(), Arc::new(BrokenLookup));
        let result = issuer.issue_token("alice@example.com", &pw("correct-pw")).await;
        assert!(matches!(result, Err(Error::Lookup(_))));
    }

    #[tokio::test]
    async fn display_name_preferred_over_email() -> Result<()> {
        let store = AccountStore::open_in_memory()?;
        store.insert_account(&AccountRecord {
            id: "cuid_abc".into(),
            email: "bob@example.com".into(),
            name: Some("Bob Builder".into()),
            password_hash: hash_secret("pw", 4)?,
        })?;
        let issuer = TokenIssuer::new(config(), Arc::new(store));
        let issued = issuer.issue_token("bob@example.com", &pw("pw")).await?;
        assert_eq!(issued.claims.name, "Bob Builder");
        assert_eq!(issued.claims.sub, "cuid_abc");
        Ok(())
    }
}
