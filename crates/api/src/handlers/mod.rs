pub mod auth;
pub mod character;
pub mod profile;
