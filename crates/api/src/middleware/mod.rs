//! Request extractors shared by handlers.
//!
//! - [`auth::AuthUser`] -- the user identified by a JWT Bearer token.

pub mod auth;
