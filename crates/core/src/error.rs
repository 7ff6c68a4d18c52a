//! Domain error type shared by every crate in the workspace.

use crate::types::DbId;

/// Errors raised by domain rules, independent of transport.
///
/// `Validation` messages are user-facing and are shown verbatim next to the
/// form that produced them.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// User input was rejected. The message is safe to display.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Unexpected failure. The message is logged, never shown.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`] from any string-like message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// The message to show an end user, if this error carries one.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Validation(msg) | Self::Conflict(msg) | Self::Unauthorized(msg) => Some(msg),
            Self::NotFound { .. } | Self::Internal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_user_visible() {
        let err = CoreError::validation("Passwords do not match.");
        assert_eq!(err.user_message(), Some("Passwords do not match."));
    }

    #[test]
    fn internal_message_is_hidden() {
        let err = CoreError::Internal("disk on fire".into());
        assert_eq!(err.user_message(), None);
        assert_eq!(err.to_string(), "Internal error: disk on fire");
    }
}
