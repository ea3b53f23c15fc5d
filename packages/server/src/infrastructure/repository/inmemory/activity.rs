//! InMemory Activity Repository 実装
//!
//! RoomId → 最終アクティビティ時刻。ここに無い Room は TTL スイープの対象外です。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ActivityRepository, RoomId, Timestamp};

#[derive(Default)]
pub struct InMemoryActivityRepository {
    last_activity: Mutex<HashMap<RoomId, Timestamp>>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn touch(&self, room_id: RoomId, at: Timestamp) {
        let mut last_activity = self.last_activity.lock().await;
        last_activity.insert(room_id, at);
    }

    async fn forget(&self, room_id: RoomId) {
        let mut last_activity = self.last_activity.lock().await;
        last_activity.remove(&room_id);
    }

    async fn last_activity(&self, room_id: RoomId) -> Option<Timestamp> {
        let last_activity = self.last_activity.lock().await;
        last_activity.get(&room_id).copied()
    }

    async fn expired(&self, now: Timestamp, ttl_millis: i64) -> Vec<RoomId> {
        let last_activity = self.last_activity.lock().await;
        let mut expired: Vec<RoomId> = last_activity
            .iter()
            .filter(|(_, at)| now.value() - at.value() >= ttl_millis)
            .map(|(room_id, _)| *room_id)
            .collect();
        expired.sort();
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expired_uses_inclusive_ttl_boundary() {
        // テスト項目: now - last >= ttl の Room だけが期限切れになる
        // given (前提条件):
        let repo = InMemoryActivityRepository::new();
        repo.touch(RoomId::new(1), Timestamp::new(0)).await;
        repo.touch(RoomId::new(2), Timestamp::new(500)).await;
        repo.touch(RoomId::new(3), Timestamp::new(501)).await;

        // when (操作):
        let expired = repo.expired(Timestamp::new(1_000), 500).await;

        // then (期待する結果):
        assert_eq!(expired, vec![RoomId::new(1), RoomId::new(2)]);
    }

    #[tokio::test]
    async fn test_forgotten_room_is_never_expired() {
        // テスト項目: forget した Room は期限切れ判定に現れない
        // given (前提条件):
        let repo = InMemoryActivityRepository::new();
        repo.touch(RoomId::new(1), Timestamp::new(0)).await;

        // when (操作):
        repo.forget(RoomId::new(1)).await;

        // then (期待する結果):
        assert!(repo.expired(Timestamp::new(i64::MAX / 2), 1).await.is_empty());
        assert_eq!(repo.last_activity(RoomId::new(1)).await, None);
    }

    #[tokio::test]
    async fn test_touch_moves_last_activity_forward() {
        // テスト項目: touch で最終アクティビティ時刻が更新される
        // given (前提条件):
        let repo = InMemoryActivityRepository::new();
        repo.touch(RoomId::new(1), Timestamp::new(0)).await;

        // when (操作):
        repo.touch(RoomId::new(1), Timestamp::new(900)).await;

        // then (期待する結果):
        assert_eq!(
            repo.last_activity(RoomId::new(1)).await,
            Some(Timestamp::new(900))
        );
        assert!(repo.expired(Timestamp::new(1_000), 500).await.is_empty());
    }
}
