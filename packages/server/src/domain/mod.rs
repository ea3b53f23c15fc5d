//! Domain layer: value objects, entities, error codes and the interfaces the
//! usecases depend on.

pub mod auth_gate;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use auth_gate::{AuthGate, ConnectionState};
pub use entity::{ChatMessage, NewChatMessage, Participant, Room, RoomSnapshot};
pub use error::{
    ErrorCode, MessagePushError, PresenceError, RepositoryError, SuccessCode, ValueObjectError,
};
pub use message_pusher::{MessagePusher, Notification, PushFrame, PusherChannel};
pub use repository::{ActivityRepository, PresenceRepository, RoomRepository};
pub use value_object::{
    ClientId, ConnectionId, MaxParticipants, MessageContent, MessageId, Nickname, RoomId,
    RoomName, Timestamp,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
#[cfg(test)]
pub use repository::{MockActivityRepository, MockPresenceRepository, MockRoomRepository};
