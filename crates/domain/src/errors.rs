//! Error types for the room, messaging, and user flows.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for room operations
pub type RoomResult<T> = Result<T, RoomError>;

/// Result type alias for message operations
pub type MessageResult<T> = Result<T, MessageError>;

/// Result type alias for user operations
pub type UserResult<T> = Result<T, UserError>;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the durable stores.
///
/// Stores must keep "not found" distinguishable from backend faults so the
/// orchestrators can translate it into the right domain error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Main error type for room lifecycle operations
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("room not found: {id}")]
    RoomNotFound { id: Uuid },

    #[error("host not found: {id}")]
    HostNotFound { id: Uuid },

    #[error("user not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("participant not found: {user_id}")]
    ParticipantNotFound { user_id: Uuid },

    #[error("room has expired")]
    RoomExpired,

    #[error("room is full: capacity {max_capacity}")]
    CapacityExceeded { max_capacity: usize },

    #[error("user already in room: {user_id}")]
    DuplicateParticipant { user_id: Uuid },

    #[error("operation restricted to the room host: {user_id}")]
    NotHost { user_id: Uuid },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Main error type for chat and signaling message operations
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("user not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("room not found: {id}")]
    RoomNotFound { id: Uuid },

    #[error("room has expired")]
    RoomExpired,

    #[error("user is not a participant in this room: {user_id}")]
    NotParticipant { user_id: Uuid },

    #[error("operation restricted to the room host: {user_id}")]
    NotHost { user_id: Uuid },

    #[error("invalid message")]
    InvalidMessage,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Main error type for user identity operations
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    UserNotFound,

    #[error("invalid user data: email and name are required")]
    InvalidUser,

    #[error(transparent)]
    Store(#[from] StoreError),
}
