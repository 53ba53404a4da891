//! One-way password hash verification.
//! Used by: issuer.

use crate::error::{Error, Result};

pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

pub trait SecretVerifier: Send + Sync {
    fn verify(&self, secret: &str, stored_hash: &str) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BcryptVerifier;

impl SecretVerifier for BcryptVerifier {
    fn verify(&self, secret: &str, stored_hash: &str) -> bool {
        match bcrypt::verify(secret, stored_hash) {
            Ok(matched) => matched,
            Err(e) => {
                // An unreadable hash can never match.
                tracing::warn!(error = %e, "stored password hash is malformed");
                false
            }
        }
    }
}

pub fn hash_secret(secret: &str, cost: u32) -> Result<String> {
    bcrypt::hash(secret, cost).map_err(|e| Error::Hashing(e.to_string()))
}
