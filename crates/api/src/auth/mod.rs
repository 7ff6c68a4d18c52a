//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access tokens and opaque-token hashing for refresh and reset links.

pub mod jwt;
pub mod password;
