//! Error taxonomy shared by the store and the lifecycle service

use crate::models::{EmailId, Folder, UserId};

/// Errors surfaced by storage and lifecycle operations
///
/// Each variant maps to a stable status code via [`EmailError::status_code`]
/// so a transport layer can render it without inspecting messages.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// A required record or argument was absent
    #[error("No email supplied")]
    NullInput,

    /// A record is missing required fields or carries invalid data
    #[error("Invalid email: {0}")]
    Validation(String),

    /// A draft update was requested without an identifier
    #[error("Email identifier cannot be empty")]
    MissingIdentifier,

    /// The record is not in the folder the operation requires
    #[error("Email folder must be {expected}, found {actual}")]
    InvalidFolder { expected: Folder, actual: String },

    /// No record exists at (user, id)
    #[error("Email {email_id} not found for user {user_id}")]
    NotFound { user_id: UserId, email_id: EmailId },

    /// The storage backend failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl EmailError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn invalid_folder(expected: Folder, actual: Option<Folder>) -> Self {
        Self::InvalidFolder {
            expected,
            actual: actual.map_or_else(|| "none".to_string(), |f| f.to_string()),
        }
    }

    /// HTTP-equivalent status for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NullInput
            | Self::Validation(_)
            | Self::MissingIdentifier
            | Self::InvalidFolder { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Storage(_) => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, EmailError>;
