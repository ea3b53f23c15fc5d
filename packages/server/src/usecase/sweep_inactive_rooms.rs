//! UseCase: 非アクティブなルームの TTL スイープ
//!
//! 最終アクティビティから TTL 以上経過したルームを、利用者によるアーカイブと
//! 同じ経路（所有者チェックなし）でアーカイブします。

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{ActivityRepository, RepositoryError, RoomId, Timestamp};

use super::archive_room::ArchiveRoomUseCase;

/// TTL スイープのユースケース
pub struct SweepInactiveRoomsUseCase {
    activity: Arc<dyn ActivityRepository>,
    archive_room: Arc<ArchiveRoomUseCase>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
}

impl SweepInactiveRoomsUseCase {
    /// 新しい SweepInactiveRoomsUseCase を作成
    pub fn new(
        activity: Arc<dyn ActivityRepository>,
        archive_room: Arc<ArchiveRoomUseCase>,
        clock: Arc<dyn Clock>,
        ttl_millis: i64,
    ) -> Self {
        Self {
            activity,
            archive_room,
            clock,
            ttl_millis,
        }
    }

    /// スイープを 1 回実行
    ///
    /// # Returns
    ///
    /// この実行でアーカイブしたルームの ID リスト
    pub async fn execute(&self) -> Vec<RoomId> {
        let now = Timestamp::new(self.clock.now_millis());
        let mut archived = Vec::new();

        for room_id in self.activity.expired(now, self.ttl_millis).await {
            match self.archive_room.archive(room_id).await {
                Ok(true) => archived.push(room_id),
                Ok(false) => {}
                Err(RepositoryError::RoomNotFound(_)) => {
                    tracing::warn!("Room {} vanished from the store, forgetting it", room_id);
                    self.activity.forget(room_id).await;
                }
                Err(e) => {
                    // 次のスイープで再試行される
                    tracing::error!("Failed to archive inactive room {}: {}", room_id, e);
                }
            }
        }

        if !archived.is_empty() {
            tracing::info!("Archived {} inactive room(s): {:?}", archived.len(), archived);
        }
        archived
    }
}
