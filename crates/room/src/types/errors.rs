//! Error types for the room.

use lobby_database::DatabaseError;
use thiserror::Error;

/// Result type alias for room operations
pub type RoomResult<T> = Result<T, RoomError>;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Participant already exists: {name}")]
    Conflict { name: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Unknown participant: {name}")]
    Unauthorized { name: String },

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

impl RoomError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }

    pub fn participant_not_found(name: &str) -> Self {
        Self::NotFound {
            what: format!("Participant {name}"),
        }
    }

    pub fn message_not_found(id: i64) -> Self {
        Self::NotFound {
            what: format!("Message {id}"),
        }
    }

    pub fn unauthorized(name: impl Into<String>) -> Self {
        Self::Unauthorized { name: name.into() }
    }
}
