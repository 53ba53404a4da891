//! HS256 token verification.
//! Used by: main (--verify), issuer tests.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::error::{Error, Result};
use crate::token::claims::Claims;

pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    if secret.is_empty() {
        return Err(Error::MissingSigningSecret);
    }
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| Error::InvalidToken(e.to_string()))?;
    Ok(data.claims)
}
