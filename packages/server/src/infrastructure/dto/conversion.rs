//! Conversion logic from domain values to DTOs.

use parlor_shared::time::millis_to_rfc3339;

use crate::domain::{ChatMessage, Notification, Participant, Room, RoomSnapshot};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&RoomSnapshot> for dto::RoomSnapshotDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        let room = &snapshot.room;
        Self {
            room_id: room.id.value(),
            name: room.name.as_str().to_string(),
            connected_clients_amount: snapshot.participant_count,
            max_clients: room.max_participants,
            creator_user_id: room.creator.as_str().to_string(),
            archived: room.archived,
        }
    }
}

impl From<&Room> for dto::ArchivedRoomDto {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id.value(),
            name: room.name.as_str().to_string(),
            creator_user_id: room.creator.as_str().to_string(),
            created_at: millis_to_rfc3339(room.created_at.value()),
            archived: room.archived,
        }
    }
}

impl From<&ChatMessage> for dto::ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.value(),
            room_id: message.room_id.value(),
            user_id: message.sender.as_str().to_string(),
            nickname: message.nickname.as_str().to_string(),
            content: message.content.as_str().to_string(),
            sent_at: millis_to_rfc3339(message.sent_at.value()),
        }
    }
}

impl From<&Participant> for dto::ConnectedClientDto {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.client_id.as_str().to_string(),
            nickname: participant.nickname.as_str().to_string(),
        }
    }
}

impl From<&Notification> for dto::ServerMessage {
    fn from(notification: &Notification) -> Self {
        match notification {
            Notification::RoomState(snapshot) => Self::RoomData {
                data: snapshot.into(),
            },
            Notification::RoomParticipants {
                room_id,
                participants,
            } => Self::RoomConnectedClients {
                data: dto::RoomConnectedClientsData {
                    room_id: room_id.value(),
                    clients: participants.iter().map(Into::into).collect(),
                },
            },
            Notification::ActiveRooms(snapshots) => Self::AllActiveRooms {
                data: dto::RoomListData {
                    rooms: snapshots.iter().map(Into::into).collect(),
                },
            },
            Notification::ChatMessage(message) => Self::ChatMessage {
                data: message.into(),
            },
            Notification::RoomDestroyed(room_id) => Self::RoomDestroyed {
                data: dto::RoomRef {
                    room_id: room_id.value(),
                },
            },
            Notification::Closed(code) => Self::Closed { code: *code },
        }
    }
}
