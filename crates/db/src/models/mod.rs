//! Row structs and DTOs.
//!
//! Each submodule holds a `FromRow` entity struct matching the table and the
//! create/update DTOs its repository accepts.

pub mod character;
pub mod password_reset;
pub mod session;
pub mod user;
