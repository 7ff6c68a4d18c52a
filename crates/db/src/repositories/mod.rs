//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async queries that
//! accept `&PgPool` as the first argument.

pub mod character_repo;
pub mod password_reset_repo;
pub mod session_repo;
pub mod user_repo;

pub use character_repo::CharacterRepo;
pub use password_reset_repo::PasswordResetRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
