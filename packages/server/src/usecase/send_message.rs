//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 検証（ルーム → アーカイブ → 内容 → 参加状態）と保存・配信
//!
//! ### なぜこのテストが必要か
//! - ルーム内の配信順序は保存順と一致しなければならない
//! - 内容はエスケープされてから保存・配信される
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者全員（送信者を含む）への配信
//! - 異常系：空・長すぎる内容、未参加、アーカイブ済みルーム
//! - 異常系：保存の失敗
//! - 競合：検証後、保存前にルームがアーカイブされた場合

use std::sync::Arc;

use parlor_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ActivityRepository, ChatMessage, ClientId, ConnectionId, MessageContent, MessagePusher,
    NewChatMessage, Notification, PresenceRepository, RoomId, RoomRepository, Timestamp,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    rooms: Arc<dyn RoomRepository>,
    presence: Arc<dyn PresenceRepository>,
    activity: Arc<dyn ActivityRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// 保存と配信キューへの投入を一続きにする
    sequencer: Mutex<()>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        presence: Arc<dyn PresenceRepository>,
        activity: Arc<dyn ActivityRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms,
            presence,
            activity,
            message_pusher,
            clock,
            sequencer: Mutex::new(()),
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 保存されたメッセージ
    /// * `Err(SendMessageError)` - 送信失敗
    pub async fn execute(
        &self,
        client_id: &ClientId,
        connection_id: ConnectionId,
        room_id: RoomId,
        content: String,
    ) -> Result<ChatMessage, SendMessageError> {
        // 1. ルームの検証
        let room = self
            .rooms
            .find_room(room_id)
            .await?
            .ok_or(SendMessageError::RoomNotFound)?;
        if room.archived {
            return Err(SendMessageError::RoomArchived);
        }

        // 2. 内容の検証（エスケープ済み）
        let content = MessageContent::new(content).map_err(SendMessageError::InvalidContent)?;

        // 3. 参加状態の検証
        let sender = self
            .presence
            .participant(room_id, client_id)
            .await
            .filter(|participant| participant.connection_id == connection_id)
            .ok_or(SendMessageError::NotInRoom)?;

        // 4. 保存と配信キューへの投入
        let _sequence = self.sequencer.lock().await;
        let sent_at = Timestamp::new(self.clock.now_millis());
        let message = self
            .rooms
            .append_message(NewChatMessage {
                room_id,
                sender: sender.client_id,
                nickname: sender.nickname,
                content,
                sent_at,
            })
            .await?;
        self.activity.touch(room_id, sent_at).await;

        let targets: Vec<ClientId> = self
            .presence
            .participants(room_id)
            .await
            .into_iter()
            .map(|participant| participant.client_id)
            .collect();
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &Notification::ChatMessage(message.clone()))
            .await
        {
            tracing::warn!("Failed to relay message {}: {}", message.id.value(), e);
        }
        tracing::debug!(
            "Client '{}' sent message {} to room {}",
            client_id,
            message.id.value(),
            room_id
        );

        Ok(message)
    }
}
