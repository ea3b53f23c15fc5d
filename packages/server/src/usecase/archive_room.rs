//! UseCase: ルームのアーカイブ
//!
//! ## 概要
//!
//! アーカイブは利用者の操作と TTL スイープの両方から呼ばれます。
//! どちらも同じ `archive` を通り、既にアーカイブ済みなら何もしません。
//!
//! 1. ストアでアーカイブ済みにする
//! 2. 参加者を全員外し、アクティビティの記録を消す
//! 3. 外れた参加者に `roomDestroyed` を送る
//! 4. 全接続に `allActiveRooms` を送る

use std::sync::Arc;

use crate::domain::{
    ActivityRepository, ClientId, MessagePusher, Notification, PresenceRepository,
    RepositoryError, RoomId, RoomRepository,
};

use super::{broadcast::Broadcaster, error::ArchiveRoomError};

/// ルームアーカイブのユースケース
pub struct ArchiveRoomUseCase {
    rooms: Arc<dyn RoomRepository>,
    presence: Arc<dyn PresenceRepository>,
    activity: Arc<dyn ActivityRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<Broadcaster>,
}

impl ArchiveRoomUseCase {
    /// 新しい ArchiveRoomUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        presence: Arc<dyn PresenceRepository>,
        activity: Arc<dyn ActivityRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            rooms,
            presence,
            activity,
            message_pusher,
            broadcaster,
        }
    }

    /// 利用者によるアーカイブ（作成者のみ）
    pub async fn execute(
        &self,
        requester: &ClientId,
        room_id: RoomId,
    ) -> Result<(), ArchiveRoomError> {
        let room = self
            .rooms
            .find_room(room_id)
            .await?
            .ok_or(ArchiveRoomError::RoomNotFound)?;
        if room.archived {
            return Err(ArchiveRoomError::AlreadyArchived);
        }
        if !room.is_owned_by(requester) {
            return Err(ArchiveRoomError::NotRoomOwner);
        }

        if !self.archive(room_id).await? {
            // 直前にスイープがアーカイブした
            return Err(ArchiveRoomError::AlreadyArchived);
        }
        Ok(())
    }

    /// システム権限でのアーカイブ
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - この呼び出しでアーカイブした
    /// * `Ok(false)` - 既にアーカイブ済みだった（何も通知しない）
    pub async fn archive(&self, room_id: RoomId) -> Result<bool, RepositoryError> {
        if !self.rooms.archive_room(room_id).await? {
            self.activity.forget(room_id).await;
            return Ok(false);
        }

        let displaced = self.presence.clear_room(room_id).await;
        self.activity.forget(room_id).await;
        tracing::info!(
            "Room {} archived, {} participant(s) displaced",
            room_id,
            displaced.len()
        );

        let targets: Vec<ClientId> = displaced
            .into_iter()
            .map(|participant| participant.client_id)
            .collect();
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &Notification::RoomDestroyed(room_id))
            .await
        {
            tracing::warn!("Failed to notify destruction of room {}: {}", room_id, e);
        }
        self.broadcaster.broadcast_active_rooms().await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConnectionId, Nickname, Participant, PushFrame, RoomName, Timestamp,
    };
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryActivityRepository, InMemoryPresenceRepository, InMemoryRoomRepository,
        },
    };
    use tokio::sync::mpsc;

    struct Fixture {
        rooms: Arc<InMemoryRoomRepository>,
        presence: Arc<InMemoryPresenceRepository>,
        activity: Arc<InMemoryActivityRepository>,
        pusher: Arc<WebSocketMessagePusher>,
        usecase: ArchiveRoomUseCase,
    }

    fn fixture() -> Fixture {
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let presence = Arc::new(InMemoryPresenceRepository::new());
        let activity = Arc::new(InMemoryActivityRepository::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let broadcaster = Arc::new(Broadcaster::new(
            rooms.clone(),
            presence.clone(),
            pusher.clone(),
        ));
        let usecase = ArchiveRoomUseCase::new(
            rooms.clone(),
            presence.clone(),
            activity.clone(),
            pusher.clone(),
            broadcaster,
        );
        Fixture {
            rooms,
            presence,
            activity,
            pusher,
            usecase,
        }
    }

    fn client(id: &str) -> ClientId {
        ClientId::new(id.to_string()).unwrap()
    }

    async fn create_room(f: &Fixture, owner: &str) -> RoomId {
        let room = f
            .rooms
            .create_room(
                RoomName::new("General".to_string()).unwrap(),
                None,
                client(owner),
                Timestamp::new(0),
            )
            .await
            .unwrap();
        f.activity.touch(room.id, Timestamp::new(0)).await;
        room.id
    }

    fn frames(rx: &mut mpsc::UnboundedReceiver<PushFrame>) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(PushFrame::Text(text)) = rx.try_recv() {
            frames.push(text);
        }
        frames
    }

    #[tokio::test]
    async fn test_owner_archives_room() {
        // テスト項目: 作成者がアーカイブすると参加者が外れ、roomDestroyed が届く
        // given (前提条件):
        let f = fixture();
        let room_id = create_room(&f, "alice").await;
        let connection_id = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        f.pusher
            .register_client(client("bob"), connection_id, tx)
            .await;
        f.presence
            .join(
                room_id,
                Participant {
                    client_id: client("bob"),
                    connection_id,
                    nickname: Nickname::new("Bob".to_string()).unwrap(),
                    joined_at: Timestamp::new(0),
                },
                None,
            )
            .await
            .unwrap();

        // when (操作):
        let result = f.usecase.execute(&client("alice"), room_id).await;

        // then (期待する結果):
        assert_eq!(result, Ok(()));
        assert!(f.rooms.find_room(room_id).await.unwrap().unwrap().archived);
        assert_eq!(f.presence.count(room_id).await, 0);
        assert_eq!(f.activity.last_activity(room_id).await, None);
        assert_eq!(
            frames(&mut rx),
            vec![
                format!(r#"{{"type":"roomDestroyed","data":{{"roomId":{}}}}}"#, room_id),
                r#"{"type":"allActiveRooms","data":{"rooms":[]}}"#.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_user_archive_rejections() {
        // テスト項目: 存在しない・アーカイブ済み・所有者以外のアーカイブは拒否される
        // given (前提条件):
        let f = fixture();
        let room_id = create_room(&f, "alice").await;
        let archived = create_room(&f, "alice").await;
        f.usecase.archive(archived).await.unwrap();

        // when (操作) / then (期待する結果):
        assert_eq!(
            f.usecase.execute(&client("alice"), RoomId::new(99)).await,
            Err(ArchiveRoomError::RoomNotFound)
        );
        assert_eq!(
            f.usecase.execute(&client("alice"), archived).await,
            Err(ArchiveRoomError::AlreadyArchived)
        );
        assert_eq!(
            f.usecase.execute(&client("mallory"), room_id).await,
            Err(ArchiveRoomError::NotRoomOwner)
        );
        assert!(!f.rooms.find_room(room_id).await.unwrap().unwrap().archived);
    }

    #[tokio::test]
    async fn test_archive_is_idempotent() {
        // テスト項目: アーカイブ済みのルームを再度アーカイブしても通知は出ない
        // given (前提条件):
        let f = fixture();
        let room_id = create_room(&f, "alice").await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        f.pusher
            .register_client(client("bob"), ConnectionId::generate(), tx)
            .await;
        assert_eq!(f.usecase.archive(room_id).await, Ok(true));
        frames(&mut rx);
        f.activity.touch(room_id, Timestamp::new(10)).await;

        // when (操作):
        let second = f.usecase.archive(room_id).await;

        // then (期待する結果):
        assert_eq!(second, Ok(false));
        assert!(frames(&mut rx).is_empty());
        assert_eq!(f.activity.last_activity(room_id).await, None);
    }
}
