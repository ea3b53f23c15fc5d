//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 切断時に全ルームから退出し、レジストリから登録を外す処理
//!
//! ### なぜこのテストが必要か
//! - 退出とレジストリ解除は一つの論理操作で、部分的に適用されてはならない
//! - 追い出された古い接続の後始末が新しい接続の状態を壊さないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加中のルームから退出し、残りの参加者に通知
//! - エッジケース：同じ identity の新しい接続が既に登録済み

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{
    ActivityRepository, ClientId, ConnectionId, MessagePusher, PresenceRepository, RoomId,
    Timestamp,
};

use super::broadcast::Broadcaster;

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    presence: Arc<dyn PresenceRepository>,
    activity: Arc<dyn ActivityRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        presence: Arc<dyn PresenceRepository>,
        activity: Arc<dyn ActivityRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            presence,
            activity,
            message_pusher,
            broadcaster,
            clock,
        }
    }

    /// 参加者切断を実行
    ///
    /// `connection_id` の接続が参加していたルームから全て退出させ、
    /// レジストリの登録がまだこの接続のものであれば外す。
    ///
    /// # Returns
    ///
    /// 退出したルームの ID リスト
    pub async fn execute(&self, client_id: &ClientId, connection_id: ConnectionId) -> Vec<RoomId> {
        let left = self.presence.leave_all(client_id, connection_id).await;

        let now = Timestamp::new(self.clock.now_millis());
        for room_id in &left {
            self.activity.touch(*room_id, now).await;
            self.broadcaster.broadcast_room(*room_id).await;
        }
        if !left.is_empty() {
            self.broadcaster.broadcast_active_rooms().await;
        }

        if self
            .message_pusher
            .unregister_client(client_id, connection_id)
            .await
        {
            tracing::info!("Client '{}' disconnected ({})", client_id, connection_id);
        }
        left
    }
}
