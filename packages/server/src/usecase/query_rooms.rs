//! UseCase: ルーム一覧・アーカイブの参照
//!
//! WebSocket の `getAllRooms` / `getAllArchivedRooms` / `getArchivedRoom` と
//! HTTP API の両方から使われる読み取り専用の操作です。

use std::sync::Arc;

use crate::domain::{ChatMessage, RepositoryError, Room, RoomId, RoomRepository, RoomSnapshot};

use super::{broadcast::Broadcaster, error::GetArchivedRoomError};

/// アーカイブ済みルームとその全メッセージ
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivedRoom {
    pub room: Room,
    pub messages: Vec<ChatMessage>,
}

/// ルーム参照のユースケース
pub struct QueryRoomsUseCase {
    rooms: Arc<dyn RoomRepository>,
    broadcaster: Arc<Broadcaster>,
}

impl QueryRoomsUseCase {
    /// 新しい QueryRoomsUseCase を作成
    pub fn new(rooms: Arc<dyn RoomRepository>, broadcaster: Arc<Broadcaster>) -> Self {
        Self { rooms, broadcaster }
    }

    /// アクティブなルームのスナップショット（ブロードキャストと同じ内容）
    pub async fn active_rooms(&self) -> Result<Vec<RoomSnapshot>, RepositoryError> {
        self.broadcaster.active_snapshots().await
    }

    pub async fn archived_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        self.rooms.list_archived_rooms().await
    }

    pub async fn archived_room(
        &self,
        room_id: RoomId,
    ) -> Result<ArchivedRoom, GetArchivedRoomError> {
        let room = self
            .rooms
            .find_room(room_id)
            .await?
            .ok_or(GetArchivedRoomError::RoomNotFound)?;
        if !room.archived {
            return Err(GetArchivedRoomError::RoomNotArchived);
        }
        let messages = self.rooms.list_messages(room_id, None).await?;
        Ok(ArchivedRoom { room, messages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ClientId, MessageContent, MockRoomRepository, NewChatMessage, Nickname, RoomName,
        Timestamp,
    };
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryPresenceRepository, InMemoryRoomRepository},
    };

    fn usecase_with(rooms: Arc<dyn RoomRepository>) -> QueryRoomsUseCase {
        let broadcaster = Arc::new(Broadcaster::new(
            rooms.clone(),
            Arc::new(InMemoryPresenceRepository::new()),
            Arc::new(WebSocketMessagePusher::new()),
        ));
        QueryRoomsUseCase::new(rooms, broadcaster)
    }

    async fn create_room(rooms: &InMemoryRoomRepository, name: &str) -> RoomId {
        rooms
            .create_room(
                RoomName::new(name.to_string()).unwrap(),
                None,
                ClientId::new("owner".to_string()).unwrap(),
                Timestamp::new(0),
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_active_and_archived_lists_are_disjoint() {
        // テスト項目: アクティブ一覧とアーカイブ一覧にはそれぞれのルームだけが含まれる
        // given (前提条件):
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let active = create_room(&rooms, "Active").await;
        let archived = create_room(&rooms, "Gone").await;
        rooms.archive_room(archived).await.unwrap();
        let usecase = usecase_with(rooms);

        // when (操作):
        let active_rooms = usecase.active_rooms().await.unwrap();
        let archived_rooms = usecase.archived_rooms().await.unwrap();

        // then (期待する結果):
        assert_eq!(active_rooms.len(), 1);
        assert_eq!(active_rooms[0].room.id, active);
        assert_eq!(archived_rooms.len(), 1);
        assert_eq!(archived_rooms[0].id, archived);
    }

    #[tokio::test]
    async fn test_archived_room_with_messages() {
        // テスト項目: アーカイブ済みルームは全メッセージと共に取得できる
        // given (前提条件):
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let room_id = create_room(&rooms, "Gone").await;
        rooms
            .append_message(NewChatMessage {
                room_id,
                sender: ClientId::new("u1".to_string()).unwrap(),
                nickname: Nickname::new("U1".to_string()).unwrap(),
                content: MessageContent::new("bye".to_string()).unwrap(),
                sent_at: Timestamp::new(0),
            })
            .await
            .unwrap();
        rooms.archive_room(room_id).await.unwrap();
        let usecase = usecase_with(rooms);

        // when (操作):
        let archived = usecase.archived_room(room_id).await.unwrap();

        // then (期待する結果):
        assert!(archived.room.archived);
        assert_eq!(archived.messages.len(), 1);
        assert_eq!(archived.messages[0].content.as_str(), "bye");
    }

    #[tokio::test]
    async fn test_archived_room_errors() {
        // テスト項目: 存在しないルームとアクティブなルームは取得できない
        // given (前提条件):
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let active = create_room(&rooms, "Active").await;
        let usecase = usecase_with(rooms);

        // when (操作) / then (期待する結果):
        assert_eq!(
            usecase.archived_room(RoomId::new(9)).await,
            Err(GetArchivedRoomError::RoomNotFound)
        );
        assert_eq!(
            usecase.archived_room(active).await,
            Err(GetArchivedRoomError::RoomNotArchived)
        );
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        // テスト項目: ストアの障害はエラーとして返される
        // given (前提条件):
        let mut rooms = MockRoomRepository::new();
        rooms
            .expect_list_archived_rooms()
            .returning(|| Err(RepositoryError::Unavailable("offline".to_string())));
        let usecase = usecase_with(Arc::new(rooms));

        // when (操作):
        let result = usecase.archived_rooms().await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
    }
}
