//! Credential primitives for account login.
//!
//! # Responsibility
//! - Hash and verify passwords (argon2id, PHC string format).
//! - Issue and verify HS256 bearer tokens carrying the account e-mail.
//!
//! # Invariants
//! - Plain passwords and token secrets are never logged.
//! - Token verification rejects expired tokens with zero leeway.

pub mod password;
pub mod token;
