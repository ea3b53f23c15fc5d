//! Entities of the relay domain.

use super::value_object::{
    ClientId, ConnectionId, MessageContent, MessageId, Nickname, RoomId, RoomName, Timestamp,
};

/// A persisted chat room
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    /// Raw capacity as stored. Only a non-negative value limits the room.
    pub max_participants: Option<i64>,
    pub creator: ClientId,
    pub archived: bool,
    pub created_at: Timestamp,
}

impl Room {
    /// Effective participant limit. `None` means unlimited.
    pub fn capacity(&self) -> Option<usize> {
        self.max_participants
            .filter(|max| *max >= 0)
            .map(|max| usize::try_from(max).unwrap_or(usize::MAX))
    }

    pub fn is_owned_by(&self, client_id: &ClientId) -> bool {
        &self.creator == client_id
    }

    /// Mark the room archived. Returns `false` if it already was.
    pub fn archive(&mut self) -> bool {
        if self.archived {
            return false;
        }
        self.archived = true;
        true
    }
}

/// A persisted chat message. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender: ClientId,
    /// Sender's nickname in the room at send time
    pub nickname: Nickname,
    pub content: MessageContent,
    pub sent_at: Timestamp,
}

/// A message about to be persisted; the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    pub room_id: RoomId,
    pub sender: ClientId,
    pub nickname: Nickname,
    pub content: MessageContent,
    pub sent_at: Timestamp,
}

impl NewChatMessage {
    pub fn into_message(self, id: MessageId) -> ChatMessage {
        ChatMessage {
            id,
            room_id: self.room_id,
            sender: self.sender,
            nickname: self.nickname,
            content: self.content,
            sent_at: self.sent_at,
        }
    }
}

/// A connection currently joined to a room
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub client_id: ClientId,
    pub connection_id: ConnectionId,
    pub nickname: Nickname,
    pub joined_at: Timestamp,
}

/// Point-in-time rendering of a room and how many are in it
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    pub room: Room,
    pub participant_count: usize,
}
