//! Account records and the lookup seam the issuer reads through.
//! Used by: issuer, main.

pub mod sqlite;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

pub trait AccountLookup: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>>;
}
