//! UseCase 層
//!
//! ユースケースごとに 1 つの構造体を持ち、依存は `Arc<dyn Trait>` で受け取ります。

pub mod archive_room;
pub mod authenticate;
pub mod broadcast;
pub mod create_room;
pub mod disconnect_participant;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod query_rooms;
pub mod send_message;
pub mod sweep_inactive_rooms;

pub use archive_room::ArchiveRoomUseCase;
pub use authenticate::AuthenticateUseCase;
pub use broadcast::Broadcaster;
pub use create_room::CreateRoomUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{
    ArchiveRoomError, AuthenticateError, CreateRoomError, GetArchivedRoomError, JoinRoomError,
    SendMessageError,
};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use query_rooms::{ArchivedRoom, QueryRoomsUseCase};
pub use send_message::SendMessageUseCase;
pub use sweep_inactive_rooms::SweepInactiveRoomsUseCase;
