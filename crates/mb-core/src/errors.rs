//! Cross-cutting error types for mentorbase.
//!
//! Domain-specific errors (e.g., `DatabaseError`, `NotifyError`) are defined in
//! their respective crates. `mb-cli` converges everything on `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any mentorbase crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The mentor's email is owned by a linked external identity.
    #[error("Email for mentor {mentor_id} is locked by a linked identity")]
    EmailLocked { mentor_id: String },

    /// The acting user is not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn transition(
        entity_type: &str,
        id: &str,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        Self::InvalidTransition {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
