//! Repository traits.
//!
//! The domain layer defines the storage interfaces the usecases need; the
//! infrastructure layer provides the implementations (dependency inversion).
//!
//! - `RoomRepository`: durable rooms and messages (the room store)
//! - `PresenceRepository`: who is in which room right now
//! - `ActivityRepository`: last activity per room, consulted by the TTL sweep

use async_trait::async_trait;

use super::{
    ChatMessage, ClientId, ConnectionId, NewChatMessage, Participant, PresenceError,
    RepositoryError, Room, RoomId, RoomName, Timestamp,
};

/// Durable room and message store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Create an active room and assign its id
    async fn create_room(
        &self,
        name: RoomName,
        max_participants: Option<i64>,
        creator: ClientId,
        created_at: Timestamp,
    ) -> Result<Room, RepositoryError>;

    async fn find_room(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError>;

    async fn list_active_rooms(&self) -> Result<Vec<Room>, RepositoryError>;

    async fn list_archived_rooms(&self) -> Result<Vec<Room>, RepositoryError>;

    /// Mark a room archived.
    ///
    /// Returns `Ok(true)` if this call archived it, `Ok(false)` if it already
    /// was archived.
    async fn archive_room(&self, room_id: RoomId) -> Result<bool, RepositoryError>;

    /// Persist a message and assign its id. Archived rooms are refused with
    /// `RepositoryError::RoomArchived`.
    async fn append_message(&self, message: NewChatMessage)
    -> Result<ChatMessage, RepositoryError>;

    /// Messages of a room in persist order. With `limit`, only the most
    /// recent `limit` messages (still oldest first).
    async fn list_messages(
        &self,
        room_id: RoomId,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;
}

/// Per-room sets of currently joined connections
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceRepository: Send + Sync {
    /// Add (or re-nickname) a participant. Capacity is checked atomically
    /// with the insert; a participant already in the room never counts
    /// against it. Returns the participant count after the join.
    async fn join(
        &self,
        room_id: RoomId,
        participant: Participant,
        capacity: Option<usize>,
    ) -> Result<usize, PresenceError>;

    /// Remove the participant if its entry belongs to `connection_id`.
    /// Returns `false` if nothing was removed.
    async fn leave(
        &self,
        room_id: RoomId,
        client_id: &ClientId,
        connection_id: ConnectionId,
    ) -> bool;

    /// Remove every entry owned by this connection and return the rooms left
    async fn leave_all(&self, client_id: &ClientId, connection_id: ConnectionId) -> Vec<RoomId>;

    /// Participants of a room ordered by client id
    async fn participants(&self, room_id: RoomId) -> Vec<Participant>;

    async fn participant(&self, room_id: RoomId, client_id: &ClientId) -> Option<Participant>;

    async fn count(&self, room_id: RoomId) -> usize;

    /// Rooms the client is currently in
    async fn rooms_of(&self, client_id: &ClientId) -> Vec<RoomId>;

    /// Drop the whole presence set of a room and return who was in it
    async fn clear_room(&self, room_id: RoomId) -> Vec<Participant>;
}

/// Last-activity clock per room
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn touch(&self, room_id: RoomId, at: Timestamp);

    /// Stop tracking a room
    async fn forget(&self, room_id: RoomId);

    async fn last_activity(&self, room_id: RoomId) -> Option<Timestamp>;

    /// Tracked rooms whose last activity is at least `ttl_millis` before `now`
    async fn expired(&self, now: Timestamp, ttl_millis: i64) -> Vec<RoomId>;
}
