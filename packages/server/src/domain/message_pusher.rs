//! Outbound notification interface.
//!
//! Usecases describe *what* a connection should be told with `Notification`;
//! the `MessagePusher` implementation decides how it is encoded and delivered.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    ChatMessage, ClientId, ConnectionId, ErrorCode, MessagePushError, Participant, RoomId,
    RoomSnapshot,
};

/// A frame queued for one socket
#[derive(Debug, Clone, PartialEq)]
pub enum PushFrame {
    /// Encoded JSON text frame
    Text(String),
    /// Close the socket after everything queued before it
    Close,
}

/// Channel feeding one socket's writer task
pub type PusherChannel = mpsc::UnboundedSender<PushFrame>;

/// Server-initiated events fanned out to connections
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Room state for the participants of that room
    RoomState(RoomSnapshot),
    /// Who is in a room right now
    RoomParticipants {
        room_id: RoomId,
        participants: Vec<Participant>,
    },
    /// Every active room, for every authenticated connection
    ActiveRooms(Vec<RoomSnapshot>),
    ChatMessage(ChatMessage),
    RoomDestroyed(RoomId),
    /// The connection is being closed by the server
    Closed(ErrorCode),
}

/// Registry of authenticated connections and delivery to them
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register a connection for `client_id`.
    ///
    /// At most one connection holds an identity. If another one does, it is
    /// sent `Closed(DuplicateConnection)`, told to close, and replaced; its
    /// `ConnectionId` is returned.
    async fn register_client(
        &self,
        client_id: ClientId,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Option<ConnectionId>;

    /// Remove the registration if it still belongs to `connection_id`.
    /// Returns whether anything was removed.
    async fn unregister_client(&self, client_id: &ClientId, connection_id: ConnectionId) -> bool;

    async fn push_to(
        &self,
        client_id: &ClientId,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;

    /// Best-effort delivery to each target; failures are logged and skipped.
    async fn broadcast(
        &self,
        targets: Vec<ClientId>,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;

    /// Best-effort delivery to every registered connection
    async fn broadcast_all(&self, notification: &Notification) -> Result<(), MessagePushError>;
}
