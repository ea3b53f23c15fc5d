//! UseCase 層のエラー定義
//!
//! 各ユースケースは自分のエラー enum を持ち、`code()` でワイヤ上の
//! `ErrorCode` に対応付けます。Repository の失敗は要求者にだけ
//! `INTERNAL_ERROR` として返します。

use thiserror::Error;

use crate::domain::{ErrorCode, PresenceError, RepositoryError, ValueObjectError};

/// 認証のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticateError {
    #[error("Authentication rejected: {}", .0.as_str())]
    Rejected(ErrorCode),
}

impl AuthenticateError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Rejected(code) => *code,
        }
    }
}

/// ルーム参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is archived")]
    RoomArchived,

    #[error("Room is full")]
    RoomFull,

    #[error("Nickname is required")]
    NicknameRequired,

    #[error("Nickname is too long")]
    NicknameTooLong,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl JoinRoomError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RoomNotFound => ErrorCode::RoomNotFound,
            Self::RoomArchived => ErrorCode::RoomArchived,
            Self::RoomFull => ErrorCode::RoomFull,
            Self::NicknameRequired => ErrorCode::NicknameRequired,
            Self::NicknameTooLong => ErrorCode::NicknameTooLong,
            Self::Repository(_) => ErrorCode::InternalError,
        }
    }
}

impl From<PresenceError> for JoinRoomError {
    fn from(error: PresenceError) -> Self {
        match error {
            PresenceError::RoomFull { .. } => Self::RoomFull,
        }
    }
}

impl From<ValueObjectError> for JoinRoomError {
    fn from(error: ValueObjectError) -> Self {
        match error {
            ValueObjectError::TooLong { .. } => Self::NicknameTooLong,
            ValueObjectError::Empty(_) | ValueObjectError::NotPositiveInteger(_) => {
                Self::NicknameRequired
            }
        }
    }
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is archived")]
    RoomArchived,

    #[error("Invalid message content: {0}")]
    InvalidContent(ValueObjectError),

    #[error("Sender is not in the room")]
    NotInRoom,

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for SendMessageError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::RoomNotFound(_) => Self::RoomNotFound,
            RepositoryError::RoomArchived(_) => Self::RoomArchived,
            error => Self::Repository(error),
        }
    }
}

impl SendMessageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RoomNotFound => ErrorCode::RoomNotFound,
            Self::RoomArchived => ErrorCode::RoomArchived,
            Self::InvalidContent(_) => ErrorCode::InvalidMessageFormat,
            Self::NotInRoom => ErrorCode::NotInRoom,
            Self::Repository(_) => ErrorCode::InternalError,
        }
    }
}

/// ルーム作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("Room name is required")]
    RoomNameRequired,

    #[error("Room name is too long")]
    RoomNameTooLong,

    #[error("Invalid max participants")]
    InvalidMaxParticipants,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CreateRoomError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RoomNameRequired => ErrorCode::RoomNameRequired,
            Self::RoomNameTooLong => ErrorCode::RoomNameTooLong,
            Self::InvalidMaxParticipants => ErrorCode::InvalidMaxParticipants,
            Self::Repository(_) => ErrorCode::InternalError,
        }
    }
}

/// ルームアーカイブ（利用者操作）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveRoomError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is already archived")]
    AlreadyArchived,

    #[error("Requester does not own the room")]
    NotRoomOwner,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ArchiveRoomError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RoomNotFound => ErrorCode::RoomNotFound,
            Self::AlreadyArchived => ErrorCode::RoomArchived,
            Self::NotRoomOwner => ErrorCode::NotRoomOwner,
            Self::Repository(_) => ErrorCode::InternalError,
        }
    }
}

/// アーカイブ済みルーム取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetArchivedRoomError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is not archived")]
    RoomNotArchived,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl GetArchivedRoomError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RoomNotFound => ErrorCode::RoomNotFound,
            Self::RoomNotArchived => ErrorCode::RoomNotArchived,
            Self::Repository(_) => ErrorCode::InternalError,
        }
    }
}
