//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object with a `type` discriminator; payload fields
//! are camelCase.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{ErrorCode, SuccessCode};

/// Inbound `type` values this server understands
const CLIENT_MESSAGE_TYPES: &[&str] = &[
    "auth",
    "requestUserId",
    "getAllRooms",
    "getAllArchivedRooms",
    "getArchivedRoom",
    "joinRoom",
    "leaveRoom",
    "sendMessage",
    "createRoom",
    "archiveRoom",
];

/// Client → server frames
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Auth {
        /// A non-string identity is kept as `None` so it is refused as
        /// `UNAUTHORIZED` instead of as a malformed frame
        #[serde(default, deserialize_with = "string_or_none")]
        user_id: Option<String>,
    },
    RequestUserId,
    GetAllRooms,
    GetAllArchivedRooms,
    GetArchivedRoom {
        room_id: i64,
    },
    JoinRoom {
        room_id: i64,
        #[serde(default)]
        nickname: Option<String>,
    },
    LeaveRoom {
        #[serde(default)]
        room_id: Option<i64>,
    },
    SendMessage {
        room_id: i64,
        #[serde(default)]
        content: String,
    },
    CreateRoom {
        #[serde(default)]
        name: String,
        /// Kept raw so a non-numeric value maps to `INVALID_MAX_PARTICIPANTS`
        #[serde(default)]
        max_clients: Option<Value>,
    },
    ArchiveRoom {
        room_id: i64,
    },
}

impl ClientMessage {
    /// Parse one text frame.
    ///
    /// - not JSON, or not an object: `INVALID_JSON`
    /// - missing or unknown `type`: `UNKNOWN_MESSAGE_TYPE`
    /// - known `type` with bad fields: `INVALID_MESSAGE_FORMAT`
    pub fn parse(text: &str) -> Result<Self, ErrorCode> {
        let value: Value = serde_json::from_str(text).map_err(|_| ErrorCode::InvalidJson)?;
        if !value.is_object() {
            return Err(ErrorCode::InvalidJson);
        }
        let known = value
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|kind| CLIENT_MESSAGE_TYPES.contains(&kind));
        if !known {
            return Err(ErrorCode::UnknownMessageType);
        }
        serde_json::from_value(value).map_err(|_| ErrorCode::InvalidMessageFormat)
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(user_id)) => Some(user_id),
        _ => None,
    })
}

/// Capacity requested by `createRoom`: `None` for null/absent, the number
/// otherwise. Anything that is not a JSON number is rejected.
pub fn requested_capacity(max_clients: Option<&Value>) -> Result<Option<f64>, ErrorCode> {
    match max_clients {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(ErrorCode::InvalidMaxParticipants),
    }
}

/// Server → client frames
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    #[serde(rename = "auth_ok")]
    AuthOk { user_id: String },
    UserIdIssued { user_id: String },
    Error { code: ErrorCode },
    Success { code: SuccessCode },
    AllActiveRooms { data: RoomListData },
    AllArchivedRooms { data: ArchivedRoomListData },
    ArchivedRoomData { data: ArchivedRoomData },
    RoomData { data: RoomSnapshotDto },
    RoomConnectedClients { data: RoomConnectedClientsData },
    RoomHistory { data: RoomHistoryData },
    ChatMessage { data: ChatMessageDto },
    RoomDestroyed { data: RoomRef },
    Closed { code: ErrorCode },
}

/// Room as shown in the active list and in `roomData`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshotDto {
    pub room_id: i64,
    pub name: String,
    pub connected_clients_amount: usize,
    pub max_clients: Option<i64>,
    pub creator_user_id: String,
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomListData {
    pub rooms: Vec<RoomSnapshotDto>,
}

/// Room as shown in the archive
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedRoomDto {
    pub room_id: i64,
    pub name: String,
    pub creator_user_id: String,
    pub created_at: String,
    pub archived: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchivedRoomListData {
    pub rooms: Vec<ArchivedRoomDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchivedRoomData {
    pub room: ArchivedRoomDto,
    pub messages: Vec<ChatMessageDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectedClientDto {
    pub id: String,
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConnectedClientsData {
    pub room_id: i64,
    pub clients: Vec<ConnectedClientDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomHistoryData {
    pub room_id: i64,
    pub messages: Vec<ChatMessageDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: i64,
    pub room_id: i64,
    pub user_id: String,
    pub nickname: String,
    pub content: String,
    pub sent_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub room_id: i64,
}
