//! Password reset token model.

use forge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `password_reset_tokens` table.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: DbId,
    pub user_id: DbId,
    /// SHA-256 hex digest of the emailed token.
    pub token_hash: String,
    pub expires_at: Timestamp,
    /// Set once the token has been redeemed.
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

pub struct CreatePasswordResetToken {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
