//! Session token claims, signing, and verification.
//! Used by: issuer, main.

pub mod claims;
pub mod sign;
pub mod verify;
