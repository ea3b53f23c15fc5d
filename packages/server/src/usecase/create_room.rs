//! UseCase: ルーム作成処理

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{
    ActivityRepository, ClientId, MaxParticipants, RoomName, RoomRepository, RoomSnapshot,
    Timestamp, ValueObjectError,
};

use super::{broadcast::Broadcaster, error::CreateRoomError};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    rooms: Arc<dyn RoomRepository>,
    activity: Arc<dyn ActivityRepository>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        activity: Arc<dyn ActivityRepository>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            activity,
            broadcaster,
            clock,
        }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `creator` - 作成者（ルームの所有者になる）
    /// * `name` - ルーム名（未検証）
    /// * `max_clients` - 定員。`None` なら無制限
    pub async fn execute(
        &self,
        creator: &ClientId,
        name: String,
        max_clients: Option<f64>,
    ) -> Result<RoomSnapshot, CreateRoomError> {
        let name = RoomName::new(name).map_err(|e| match e {
            ValueObjectError::TooLong { .. } => CreateRoomError::RoomNameTooLong,
            _ => CreateRoomError::RoomNameRequired,
        })?;
        let max_participants = max_clients
            .map(MaxParticipants::new)
            .transpose()
            .map_err(|_| CreateRoomError::InvalidMaxParticipants)?;

        let created_at = Timestamp::new(self.clock.now_millis());
        let room = self
            .rooms
            .create_room(
                name,
                max_participants.map(|max| max.value()),
                creator.clone(),
                created_at,
            )
            .await?;
        self.activity.touch(room.id, created_at).await;
        tracing::info!(
            "Client '{}' created room {} ({})",
            creator,
            room.id,
            room.name.as_str()
        );

        self.broadcaster.broadcast_active_rooms().await;
        Ok(self.broadcaster.snapshot(room).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, MessagePusher, PushFrame};
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryActivityRepository, InMemoryPresenceRepository, InMemoryRoomRepository,
        },
    };
    use parlor_shared::time::ManualClock;
    use tokio::sync::mpsc;

    struct Fixture {
        rooms: Arc<InMemoryRoomRepository>,
        activity: Arc<InMemoryActivityRepository>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: CreateRoomUseCase,
    }

    fn fixture() -> Fixture {
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let activity = Arc::new(InMemoryActivityRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let broadcaster = Arc::new(Broadcaster::new(
            rooms.clone(),
            Arc::new(InMemoryPresenceRepository::new()),
            pusher.clone(),
        ));
        let usecase = CreateRoomUseCase::new(
            rooms.clone(),
            activity.clone(),
            broadcaster,
            Arc::new(ManualClock::new(2_000)),
        );
        Fixture {
            rooms,
            activity,
            pusher,
            usecase,
        }
    }

    fn alice() -> ClientId {
        ClientId::new("alice".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_room_success() {
        // テスト項目: ルームが作成され、アクティビティが記録され、全接続に一覧が送られる
        // given (前提条件):
        let f = fixture();
        let (tx, mut rx) = mpsc::unbounded_channel();
        f.pusher
            .register_client(ClientId::new("bob".to_string()).unwrap(), ConnectionId::generate(), tx)
            .await;

        // when (操作):
        let snapshot = f
            .usecase
            .execute(&alice(), "General".to_string(), Some(5.0))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.participant_count, 0);
        assert_eq!(snapshot.room.max_participants, Some(5));
        assert!(snapshot.room.is_owned_by(&alice()));
        assert_eq!(
            f.activity.last_activity(snapshot.room.id).await,
            Some(Timestamp::new(2_000))
        );
        match rx.try_recv() {
            Ok(PushFrame::Text(text)) => assert!(text.contains(r#""type":"allActiveRooms""#)),
            other => panic!("expected allActiveRooms, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_room_without_limit() {
        // テスト項目: 定員を省略すると無制限のルームになる
        // given (前提条件):
        let f = fixture();

        // when (操作):
        let snapshot = f
            .usecase
            .execute(&alice(), "Lobby".to_string(), None)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.room.capacity(), None);
    }

    #[tokio::test]
    async fn test_create_room_validation_errors() {
        // テスト項目: ルーム名と定員の不正が拒否され、ルームは作成されない
        // given (前提条件):
        let f = fixture();

        // when (操作) / then (期待する結果):
        assert_eq!(
            f.usecase.execute(&alice(), "  ".to_string(), None).await,
            Err(CreateRoomError::RoomNameRequired)
        );
        assert_eq!(
            f.usecase.execute(&alice(), "n".repeat(65), None).await,
            Err(CreateRoomError::RoomNameTooLong)
        );
        for bad in [0.0, -3.0, 2.5, f64::NAN] {
            assert_eq!(
                f.usecase
                    .execute(&alice(), "General".to_string(), Some(bad))
                    .await,
                Err(CreateRoomError::InvalidMaxParticipants),
                "max_clients = {bad}"
            );
        }
        assert!(f.rooms.list_active_rooms().await.unwrap().is_empty());
    }
}
