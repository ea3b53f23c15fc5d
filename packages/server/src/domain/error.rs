//! Domain errors and the stable wire codes clients branch on.

use serde::Serialize;
use thiserror::Error;

/// Rejected input while building a value object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} is {length} characters long (max {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        length: usize,
    },

    #[error("{0} must be a positive whole number")]
    NotPositiveInteger(&'static str),
}

/// Failure reported by the room store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room {0} not found")]
    RoomNotFound(i64),

    #[error("Room {0} is archived")]
    RoomArchived(i64),

    #[error("Room store unavailable: {0}")]
    Unavailable(String),
}

/// Failure joining a presence set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    #[error("Room {room_id} is full ({capacity} participants)")]
    RoomFull { room_id: i64, capacity: usize },
}

/// Failure pushing a frame to a connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Client '{0}' is not connected")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),

    #[error("Failed to encode message: {0}")]
    EncodeFailed(String),
}

/// Stable error codes sent in `error` and `closed` frames.
///
/// The string form of a code never changes meaning between releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    AuthTimeout,
    AlreadyAuthenticated,
    DuplicateConnection,
    InvalidJson,
    UnknownMessageType,
    InvalidMessageFormat,
    RoomNotFound,
    RoomArchived,
    RoomNotArchived,
    RoomFull,
    NicknameRequired,
    NicknameTooLong,
    NotInRoom,
    RoomNameRequired,
    RoomNameTooLong,
    InvalidMaxParticipants,
    NotRoomOwner,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::AuthTimeout => "AUTH_TIMEOUT",
            Self::AlreadyAuthenticated => "ALREADY_AUTHENTICATED",
            Self::DuplicateConnection => "DUPLICATE_CONNECTION",
            Self::InvalidJson => "INVALID_JSON",
            Self::UnknownMessageType => "UNKNOWN_MESSAGE_TYPE",
            Self::InvalidMessageFormat => "INVALID_MESSAGE_FORMAT",
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoomArchived => "ROOM_ARCHIVED",
            Self::RoomNotArchived => "ROOM_NOT_ARCHIVED",
            Self::RoomFull => "ROOM_FULL",
            Self::NicknameRequired => "NICKNAME_REQUIRED",
            Self::NicknameTooLong => "NICKNAME_TOO_LONG",
            Self::NotInRoom => "NOT_IN_ROOM",
            Self::RoomNameRequired => "ROOM_NAME_REQUIRED",
            Self::RoomNameTooLong => "ROOM_NAME_TOO_LONG",
            Self::InvalidMaxParticipants => "INVALID_MAX_PARTICIPANTS",
            Self::NotRoomOwner => "NOT_ROOM_OWNER",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Codes sent in `success` frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuccessCode {
    RoomCreated,
    RoomArchived,
    RoomLeft,
}
