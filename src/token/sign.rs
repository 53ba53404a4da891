//! HS256 token signing.
//! Used by: issuer.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::error::{Error, Result};
use crate::token::claims::Claims;

pub fn sign_token(claims: &Claims, secret: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(Error::MissingSigningSecret);
    }
    let header = Header::new(Algorithm::HS256);
    let token = encode(&header, claims, &EncodingKey::from_secret(secret.as_bytes()))?;
    Ok(token)
}
