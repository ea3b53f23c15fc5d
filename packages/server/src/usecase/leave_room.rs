//! UseCase: ルーム退出処理
//!
//! 参加者がいなくなってもルームは破棄しません。TTL スイープの対象として
//! 残り、メッセージ履歴も参照できます。

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{
    ActivityRepository, ClientId, ConnectionId, PresenceRepository, RoomId, Timestamp,
};

use super::broadcast::Broadcaster;

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    presence: Arc<dyn PresenceRepository>,
    activity: Arc<dyn ActivityRepository>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(
        presence: Arc<dyn PresenceRepository>,
        activity: Arc<dyn ActivityRepository>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            presence,
            activity,
            broadcaster,
            clock,
        }
    }

    /// ルーム退出を実行
    ///
    /// `room_id` が `None` なら、この接続が参加している全ルームから退出する。
    /// 参加していないルームの指定は何もしない。
    ///
    /// # Returns
    ///
    /// 実際に退出したルームの ID リスト
    pub async fn execute(
        &self,
        client_id: &ClientId,
        connection_id: ConnectionId,
        room_id: Option<RoomId>,
    ) -> Vec<RoomId> {
        let left = match room_id {
            Some(room_id) => {
                if self
                    .presence
                    .leave(room_id, client_id, connection_id)
                    .await
                {
                    vec![room_id]
                } else {
                    Vec::new()
                }
            }
            None => self.presence.leave_all(client_id, connection_id).await,
        };

        let now = Timestamp::new(self.clock.now_millis());
        for room_id in &left {
            self.activity.touch(*room_id, now).await;
            tracing::info!("Client '{}' left room {}", client_id, room_id);
            self.broadcaster.broadcast_room(*room_id).await;
        }
        if !left.is_empty() {
            self.broadcaster.broadcast_active_rooms().await;
        }
        left
    }
}
