//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する `RoomRepository` trait の具体的な実装。
//! Room とメッセージを BTreeMap / Vec に保持します。永続性は保証しません。

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, ClientId, MessageId, NewChatMessage, RepositoryError, Room, RoomId,
    RoomName, RoomRepository, Timestamp,
};

#[derive(Default)]
struct Store {
    rooms: BTreeMap<RoomId, Room>,
    messages: HashMap<RoomId, Vec<ChatMessage>>,
    last_room_id: i64,
    last_message_id: i64,
}

/// インメモリ Room Repository 実装
///
/// Room id と Message id はそれぞれ 1 から単調増加で採番されます。
#[derive(Default)]
pub struct InMemoryRoomRepository {
    store: Mutex<Store>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(
        &self,
        name: RoomName,
        max_participants: Option<i64>,
        creator: ClientId,
        created_at: Timestamp,
    ) -> Result<Room, RepositoryError> {
        let mut store = self.store.lock().await;
        store.last_room_id += 1;
        let room = Room {
            id: RoomId::new(store.last_room_id),
            name,
            max_participants,
            creator,
            archived: false,
            created_at,
        };
        store.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    async fn find_room(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.rooms.get(&room_id).cloned())
    }

    async fn list_active_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .rooms
            .values()
            .filter(|room| !room.archived)
            .cloned()
            .collect())
    }

    async fn list_archived_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .rooms
            .values()
            .filter(|room| room.archived)
            .cloned()
            .collect())
    }

    async fn archive_room(&self, room_id: RoomId) -> Result<bool, RepositoryError> {
        let mut store = self.store.lock().await;
        let room = store
            .rooms
            .get_mut(&room_id)
            .ok_or(RepositoryError::RoomNotFound(room_id.value()))?;
        Ok(room.archive())
    }

    async fn append_message(
        &self,
        message: NewChatMessage,
    ) -> Result<ChatMessage, RepositoryError> {
        let mut store = self.store.lock().await;
        let room = store
            .rooms
            .get(&message.room_id)
            .ok_or(RepositoryError::RoomNotFound(message.room_id.value()))?;
        if room.archived {
            return Err(RepositoryError::RoomArchived(room.id.value()));
        }
        store.last_message_id += 1;
        let saved = message.into_message(MessageId::new(store.last_message_id));
        store
            .messages
            .entry(saved.room_id)
            .or_default()
            .push(saved.clone());
        Ok(saved)
    }

    async fn list_messages(
        &self,
        room_id: RoomId,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let store = self.store.lock().await;
        let messages = store.messages.get(&room_id).map(Vec::as_slice).unwrap_or_default();
        let skip = limit.map_or(0, |limit| messages.len().saturating_sub(limit));
        Ok(messages[skip..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageContent, Nickname};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomRepository の Room 作成・検索・アーカイブ
    // - メッセージの追加と履歴取得（順序・件数制限）
    //
    // 【なぜこのテストが必要か】
    // - 配信順序は保存時に採番される id に依存する
    // - アーカイブの冪等性はスイープとユーザー操作の競合を安全にする前提
    // ========================================

    fn client_id(raw: &str) -> ClientId {
        ClientId::new(raw.to_string()).unwrap()
    }

    async fn create_room(repo: &InMemoryRoomRepository, name: &str) -> Room {
        repo.create_room(
            RoomName::new(name.to_string()).unwrap(),
            Some(5),
            client_id("u1"),
            Timestamp::new(1_000),
        )
        .await
        .unwrap()
    }

    fn new_message(room_id: RoomId, content: &str) -> NewChatMessage {
        NewChatMessage {
            room_id,
            sender: client_id("u1"),
            nickname: Nickname::new("Ada".to_string()).unwrap(),
            content: MessageContent::new(content.to_string()).unwrap(),
            sent_at: Timestamp::new(2_000),
        }
    }

    #[tokio::test]
    async fn test_create_room_assigns_increasing_ids() {
        // テスト項目: Room 作成時に 1 から増加する id が採番される
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();

        // when (操作):
        let first = create_room(&repo, "General").await;
        let second = create_room(&repo, "Random").await;

        // then (期待する結果):
        assert_eq!(first.id, RoomId::new(1));
        assert_eq!(second.id, RoomId::new(2));
        assert!(!first.archived);
        assert_eq!(first.max_participants, Some(5));
        assert_eq!(repo.find_room(second.id).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_archive_room_is_idempotent() {
        // テスト項目: アーカイブは一度目だけ true を返し、二度目は false
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let room = create_room(&repo, "General").await;

        // when (操作):
        let first = repo.archive_room(room.id).await;
        let second = repo.archive_room(room.id).await;

        // then (期待する結果):
        assert_eq!(first, Ok(true));
        assert_eq!(second, Ok(false));
        assert!(repo.list_active_rooms().await.unwrap().is_empty());
        assert_eq!(repo.list_archived_rooms().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_archive_unknown_room_is_not_found() {
        // テスト項目: 存在しない Room のアーカイブは RoomNotFound
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();

        // when (操作):
        let result = repo.archive_room(RoomId::new(42)).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::RoomNotFound(42)));
    }

    #[tokio::test]
    async fn test_append_message_keeps_persist_order() {
        // テスト項目: メッセージは保存順に id が採番され、その順で取得できる
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let room = create_room(&repo, "General").await;

        // when (操作):
        let m1 = repo.append_message(new_message(room.id, "one")).await.unwrap();
        let m2 = repo.append_message(new_message(room.id, "two")).await.unwrap();
        let history = repo.list_messages(room.id, None).await.unwrap();

        // then (期待する結果):
        assert!(m1.id < m2.id);
        assert_eq!(history, vec![m1, m2]);
    }

    #[tokio::test]
    async fn test_list_messages_limit_returns_most_recent() {
        // テスト項目: limit 指定時は最新 N 件を古い順で返す
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let room = create_room(&repo, "General").await;
        for content in ["one", "two", "three"] {
            repo.append_message(new_message(room.id, content)).await.unwrap();
        }

        // when (操作):
        let history = repo.list_messages(room.id, Some(2)).await.unwrap();

        // then (期待する結果):
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "three"]);
    }

    #[tokio::test]
    async fn test_append_message_to_unknown_room_fails() {
        // テスト項目: 存在しない Room へのメッセージ追加はエラー
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();

        // when (操作):
        let result = repo.append_message(new_message(RoomId::new(9), "hi")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::RoomNotFound(9)));
    }

    #[tokio::test]
    async fn test_append_message_to_archived_room_is_refused() {
        // テスト項目: アーカイブ済み Room へのメッセージ追加は拒否され、履歴は変わらない
        // given (前提条件):
        let repo = InMemoryRoomRepository::new();
        let room = create_room(&repo, "General").await;
        repo.append_message(new_message(room.id, "before")).await.unwrap();
        repo.archive_room(room.id).await.unwrap();

        // when (操作):
        let result = repo.append_message(new_message(room.id, "after")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::RoomArchived(room.id.value())));
        let history = repo.list_messages(room.id, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content.as_str(), "before");
    }
}
