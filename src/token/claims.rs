//! NextAuth-compatible session claims.
//! Used by: token::sign, token::verify, issuer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountRecord;

/// Fixed session lifetime: 7 days.
pub const TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn new(account: &AccountRecord, issued_at: DateTime<Utc>) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: account.id.clone(),
            email: account.email.clone(),
            name: display_label(account),
            iat,
            exp: iat + TOKEN_TTL_SECONDS,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// The account's name, or the local part of its email when no name is set.
pub fn display_label(account: &AccountRecord) -> String {
    match account.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => account
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}
