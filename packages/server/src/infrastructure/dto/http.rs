//! HTTP API response DTOs.

use serde::Serialize;

use super::websocket::{ArchivedRoomDto, ChatMessageDto, RoomSnapshotDto};
use crate::domain::ErrorCode;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveRoomsDto {
    pub rooms: Vec<RoomSnapshotDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchivedRoomsDto {
    pub rooms: Vec<ArchivedRoomDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchivedRoomDetailDto {
    pub room: ArchivedRoomDto,
    pub messages: Vec<ChatMessageDto>,
}

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDto {
    pub code: ErrorCode,
}
