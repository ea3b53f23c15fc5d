//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルームの存在・アーカイブ・定員・ニックネームの検証と参加後の通知
//!
//! ### なぜこのテストが必要か
//! - 定員チェックと参加は同時に行われる必要がある（C+1 人目は必ず拒否）
//! - 参加者には最新の履歴とルーム状態が届くことを保証
//! - 失敗した参加は在室状態・アクティビティ・通知のいずれも残さない
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加、再参加によるニックネーム更新、排他ルーム設定
//! - 異常系：存在しない・アーカイブ済み・満員のルーム、ニックネーム不正
//! - 異常系：Repository の障害（参加前の状態に戻ること）

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::domain::{
    ActivityRepository, ChatMessage, ClientId, ConnectionId, Nickname, Participant,
    PresenceRepository, RoomId, RoomRepository, Timestamp,
};

use super::{broadcast::Broadcaster, error::JoinRoomError};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    rooms: Arc<dyn RoomRepository>,
    presence: Arc<dyn PresenceRepository>,
    activity: Arc<dyn ActivityRepository>,
    broadcaster: Arc<Broadcaster>,
    clock: Arc<dyn Clock>,
    history_limit: usize,
    /// 参加時に他のルームから退出させるか
    exclusive_rooms: bool,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        presence: Arc<dyn PresenceRepository>,
        activity: Arc<dyn ActivityRepository>,
        broadcaster: Arc<Broadcaster>,
        clock: Arc<dyn Clock>,
        history_limit: usize,
        exclusive_rooms: bool,
    ) -> Self {
        Self {
            rooms,
            presence,
            activity,
            broadcaster,
            clock,
            history_limit,
            exclusive_rooms,
        }
    }

    /// ルーム参加を実行
    ///
    /// 検証はルームの存在 → アーカイブ → ニックネーム → 定員の順。
    /// 参加後の確認か履歴の取得に失敗した場合は参加前の状態に戻し、
    /// 通知もアクティビティの更新も行わない。
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ChatMessage>)` - 直近のメッセージ（古い順）
    /// * `Err(JoinRoomError)` - 参加失敗
    pub async fn execute(
        &self,
        client_id: &ClientId,
        connection_id: ConnectionId,
        room_id: RoomId,
        nickname: Option<String>,
    ) -> Result<Vec<ChatMessage>, JoinRoomError> {
        // 1. ルームの検証
        let room = self
            .rooms
            .find_room(room_id)
            .await?
            .ok_or(JoinRoomError::RoomNotFound)?;
        if room.archived {
            return Err(JoinRoomError::RoomArchived);
        }

        // 2. ニックネームの検証
        let nickname = Nickname::new(nickname.ok_or(JoinRoomError::NicknameRequired)?)?;

        // 3. 排他ルーム設定なら他のルームから退出
        if self.exclusive_rooms {
            self.leave_other_rooms(client_id, connection_id, room_id).await;
        }

        // 4. 定員チェックと参加を同時に行う
        let now = Timestamp::new(self.clock.now_millis());
        let previous = self.presence.participant(room_id, client_id).await;
        let participant = Participant {
            client_id: client_id.clone(),
            connection_id,
            nickname,
            joined_at: now,
        };
        self.presence
            .join(room_id, participant, room.capacity())
            .await?;

        // 5. 参加中にアーカイブされていないか確認し、履歴を取得する
        let history = match self.confirm_and_load_history(room_id).await {
            Ok(history) => history,
            Err(e) => {
                self.rollback(room_id, client_id, connection_id, previous, &e)
                    .await;
                return Err(e);
            }
        };

        self.activity.touch(room_id, now).await;
        tracing::info!("Client '{}' joined room {}", client_id, room_id);

        // 6. 通知
        self.broadcaster.broadcast_room(room_id).await;
        self.broadcaster.broadcast_active_rooms().await;

        Ok(history)
    }

    async fn confirm_and_load_history(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<ChatMessage>, JoinRoomError> {
        match self.rooms.find_room(room_id).await? {
            Some(room) if !room.archived => {}
            Some(_) => return Err(JoinRoomError::RoomArchived),
            None => return Err(JoinRoomError::RoomNotFound),
        }
        Ok(self
            .rooms
            .list_messages(room_id, Some(self.history_limit))
            .await?)
    }

    /// この接続の参加を取り消す。ストア障害による失敗なら、
    /// 同じ接続での参加前の状態（ニックネーム）を戻す
    async fn rollback(
        &self,
        room_id: RoomId,
        client_id: &ClientId,
        connection_id: ConnectionId,
        previous: Option<Participant>,
        cause: &JoinRoomError,
    ) {
        self.presence.leave(room_id, client_id, connection_id).await;

        let restorable = previous.filter(|previous| {
            previous.connection_id == connection_id
                && matches!(cause, JoinRoomError::Repository(_))
        });
        if let Some(previous) = restorable
            && let Err(e) = self.presence.join(room_id, previous, None).await
        {
            tracing::warn!("Failed to restore presence in room {}: {}", room_id, e);
        }
        tracing::debug!(
            "Join of client '{}' to room {} rolled back: {}",
            client_id,
            room_id,
            cause
        );
    }

    async fn leave_other_rooms(
        &self,
        client_id: &ClientId,
        connection_id: ConnectionId,
        keep: RoomId,
    ) {
        let now = Timestamp::new(self.clock.now_millis());
        for other in self.presence.rooms_of(client_id).await {
            if other != keep && self.presence.leave(other, client_id, connection_id).await {
                self.activity.touch(other, now).await;
                self.broadcaster.broadcast_room(other).await;
            }
        }
    }
}
