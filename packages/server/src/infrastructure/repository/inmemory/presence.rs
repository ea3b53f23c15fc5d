//! InMemory Presence Repository 実装
//!
//! RoomId → (ClientId → Participant) のマップで「今この部屋にいる接続」を保持します。
//! 永続化はしません。

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ClientId, ConnectionId, Participant, PresenceError, PresenceRepository, RoomId,
};

#[derive(Default)]
pub struct InMemoryPresenceRepository {
    rooms: Mutex<HashMap<RoomId, BTreeMap<ClientId, Participant>>>,
}

impl InMemoryPresenceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceRepository for InMemoryPresenceRepository {
    async fn join(
        &self,
        room_id: RoomId,
        participant: Participant,
        capacity: Option<usize>,
    ) -> Result<usize, PresenceError> {
        let mut rooms = self.rooms.lock().await;
        let members = rooms.entry(room_id).or_default();

        let already_joined = members.contains_key(&participant.client_id);
        if let Some(capacity) = capacity
            && !already_joined
            && members.len() >= capacity
        {
            if members.is_empty() {
                rooms.remove(&room_id);
            }
            return Err(PresenceError::RoomFull {
                room_id: room_id.value(),
                capacity,
            });
        }

        members.insert(participant.client_id.clone(), participant);
        Ok(members.len())
    }

    async fn leave(
        &self,
        room_id: RoomId,
        client_id: &ClientId,
        connection_id: ConnectionId,
    ) -> bool {
        let mut rooms = self.rooms.lock().await;
        let Some(members) = rooms.get_mut(&room_id) else {
            return false;
        };
        let owned = members
            .get(client_id)
            .is_some_and(|p| p.connection_id == connection_id);
        if owned {
            members.remove(client_id);
        }
        if members.is_empty() {
            rooms.remove(&room_id);
        }
        owned
    }

    async fn leave_all(&self, client_id: &ClientId, connection_id: ConnectionId) -> Vec<RoomId> {
        let mut rooms = self.rooms.lock().await;
        let mut left = Vec::new();
        for (room_id, members) in rooms.iter_mut() {
            let owned = members
                .get(client_id)
                .is_some_and(|p| p.connection_id == connection_id);
            if owned {
                members.remove(client_id);
                left.push(*room_id);
            }
        }
        rooms.retain(|_, members| !members.is_empty());
        left.sort();
        left
    }

    async fn participants(&self, room_id: RoomId) -> Vec<Participant> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(&room_id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    async fn participant(&self, room_id: RoomId, client_id: &ClientId) -> Option<Participant> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(&room_id)
            .and_then(|members| members.get(client_id))
            .cloned()
    }

    async fn count(&self, room_id: RoomId) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.get(&room_id).map_or(0, BTreeMap::len)
    }

    async fn rooms_of(&self, client_id: &ClientId) -> Vec<RoomId> {
        let rooms = self.rooms.lock().await;
        let mut joined: Vec<RoomId> = rooms
            .iter()
            .filter(|(_, members)| members.contains_key(client_id))
            .map(|(room_id, _)| *room_id)
            .collect();
        joined.sort();
        joined
    }

    async fn clear_room(&self, room_id: RoomId) -> Vec<Participant> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .remove(&room_id)
            .map(|members| members.into_values().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Nickname, Timestamp};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 参加・退出・定員チェック・接続単位の一括退出
    //
    // 【どのようなシナリオをテストするか】
    // 1. 定員 C の部屋に C+1 人目は参加できず、誰かが抜ければ参加できる
    // 2. 再参加はニックネームの更新のみで定員を消費しない
    // 3. leave / leave_all は同じ ClientId でも別接続の参加は消さない
    // ========================================

    fn participant(id: &str, connection_id: ConnectionId) -> Participant {
        Participant {
            client_id: ClientId::new(id.to_string()).unwrap(),
            connection_id,
            nickname: Nickname::new(id.to_uppercase()).unwrap(),
            joined_at: Timestamp::new(1_000),
        }
    }

    #[tokio::test]
    async fn test_join_until_capacity_then_room_full() {
        // テスト項目: 定員に達した部屋への参加は RoomFull、退出後は参加できる
        // given (前提条件):
        let repo = InMemoryPresenceRepository::new();
        let room_id = RoomId::new(7);
        let a_connection = ConnectionId::generate();
        repo.join(room_id, participant("a", a_connection), Some(2))
            .await
            .unwrap();
        repo.join(room_id, participant("b", ConnectionId::generate()), Some(2))
            .await
            .unwrap();

        // when (操作):
        let third = repo
            .join(room_id, participant("c", ConnectionId::generate()), Some(2))
            .await;
        repo.leave(room_id, &ClientId::new("a".to_string()).unwrap(), a_connection)
            .await;
        let retry = repo
            .join(room_id, participant("c", ConnectionId::generate()), Some(2))
            .await;

        // then (期待する結果):
        assert_eq!(
            third,
            Err(PresenceError::RoomFull {
                room_id: 7,
                capacity: 2
            })
        );
        assert_eq!(retry, Ok(2));
    }

    #[tokio::test]
    async fn test_rejoin_updates_nickname_without_consuming_capacity() {
        // テスト項目: 参加済みの再参加はニックネームを更新し、定員を消費しない
        // given (前提条件):
        let repo = InMemoryPresenceRepository::new();
        let room_id = RoomId::new(1);
        let connection_id = ConnectionId::generate();
        repo.join(room_id, participant("a", connection_id), Some(1))
            .await
            .unwrap();

        // when (操作):
        let mut renamed = participant("a", connection_id);
        renamed.nickname = Nickname::new("Ada".to_string()).unwrap();
        let result = repo.join(room_id, renamed, Some(1)).await;

        // then (期待する結果):
        assert_eq!(result, Ok(1));
        let stored = repo
            .participant(room_id, &ClientId::new("a".to_string()).unwrap())
            .await
            .unwrap();
        assert_eq!(stored.nickname.as_str(), "Ada");
    }

    #[tokio::test]
    async fn test_zero_capacity_room_rejects_everyone() {
        // テスト項目: 定員 0 の部屋には誰も参加できず、空の集合も残らない
        // given (前提条件):
        let repo = InMemoryPresenceRepository::new();
        let room_id = RoomId::new(3);

        // when (操作):
        let result = repo
            .join(room_id, participant("a", ConnectionId::generate()), Some(0))
            .await;

        // then (期待する結果):
        assert!(result.is_err());
        assert_eq!(repo.count(room_id).await, 0);
    }

    #[tokio::test]
    async fn test_leave_absent_participant_is_noop() {
        // テスト項目: 参加していない部屋からの退出は何もしない
        // given (前提条件):
        let repo = InMemoryPresenceRepository::new();

        // when (操作):
        let removed = repo
            .leave(
                RoomId::new(1),
                &ClientId::new("ghost".to_string()).unwrap(),
                ConnectionId::generate(),
            )
            .await;

        // then (期待する結果):
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_leave_from_stale_connection_keeps_current_entry() {
        // テスト項目: 置き換えられた接続からの退出は、新しい接続の参加を消さない
        // given (前提条件):
        let repo = InMemoryPresenceRepository::new();
        let room_id = RoomId::new(1);
        let old_connection = ConnectionId::generate();
        let new_connection = ConnectionId::generate();
        repo.join(room_id, participant("a", new_connection), None)
            .await
            .unwrap();
        let client_id = ClientId::new("a".to_string()).unwrap();

        // when (操作):
        let stale = repo.leave(room_id, &client_id, old_connection).await;
        let current = repo.leave(room_id, &client_id, new_connection).await;

        // then (期待する結果):
        assert!(!stale);
        assert!(current);
        assert_eq!(repo.count(room_id).await, 0);
    }

    #[tokio::test]
    async fn test_leave_all_only_removes_entries_of_that_connection() {
        // テスト項目: leave_all は指定した接続の参加だけを削除する
        // given (前提条件):
        let repo = InMemoryPresenceRepository::new();
        let old_connection = ConnectionId::generate();
        let new_connection = ConnectionId::generate();
        repo.join(RoomId::new(1), participant("a", old_connection), None)
            .await
            .unwrap();
        repo.join(RoomId::new(2), participant("a", old_connection), None)
            .await
            .unwrap();
        repo.join(RoomId::new(3), participant("a", new_connection), None)
            .await
            .unwrap();
        let client_id = ClientId::new("a".to_string()).unwrap();

        // when (操作):
        let left = repo.leave_all(&client_id, old_connection).await;

        // then (期待する結果):
        assert_eq!(left, vec![RoomId::new(1), RoomId::new(2)]);
        assert_eq!(repo.rooms_of(&client_id).await, vec![RoomId::new(3)]);
    }

    #[tokio::test]
    async fn test_participants_are_ordered_and_clear_room_drops_them() {
        // テスト項目: 参加者は client_id 順に並び、clear_room で全員が返されて空になる
        // given (前提条件):
        let repo = InMemoryPresenceRepository::new();
        let room_id = RoomId::new(1);
        for id in ["charlie", "alice", "bob"] {
            repo.join(room_id, participant(id, ConnectionId::generate()), None)
                .await
                .unwrap();
        }

        // when (操作):
        let listed = repo.participants(room_id).await;
        let cleared = repo.clear_room(room_id).await;

        // then (期待する結果):
        let ids: Vec<&str> = listed.iter().map(|p| p.client_id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bob", "charlie"]);
        assert_eq!(cleared.len(), 3);
        assert_eq!(repo.count(room_id).await, 0);
    }
}
