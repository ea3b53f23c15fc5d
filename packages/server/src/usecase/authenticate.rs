//! UseCase: 認証処理
//!
//! ソケットの `AuthGate` を進め、接続をレジストリに登録します。
//! 同じ identity の接続が既にあれば、古い接続を追い出してから
//! その接続のルーム参加を後始末します。

use std::sync::Arc;

use crate::domain::{AuthGate, ClientId, ConnectionId, MessagePusher, PusherChannel};

use super::{disconnect_participant::DisconnectParticipantUseCase, error::AuthenticateError};

/// 認証のユースケース
pub struct AuthenticateUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    disconnect_participant: Arc<DisconnectParticipantUseCase>,
}

impl AuthenticateUseCase {
    /// 新しい AuthenticateUseCase を作成
    pub fn new(
        message_pusher: Arc<dyn MessagePusher>,
        disconnect_participant: Arc<DisconnectParticipantUseCase>,
    ) -> Self {
        Self {
            message_pusher,
            disconnect_participant,
        }
    }

    /// 認証を実行
    ///
    /// # Arguments
    ///
    /// * `gate` - このソケットの認証状態
    /// * `user_id` - クライアントが名乗った identity（未検証）
    /// * `connection_id` - このソケットの接続 ID
    /// * `sender` - このソケットへの送信チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(ClientId)` - 認証成功。ゲートは Authenticated に遷移済み
    /// * `Err(AuthenticateError)` - 拒否。ゲートの状態は変わらない
    pub async fn execute(
        &self,
        gate: &mut AuthGate,
        user_id: Option<String>,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<ClientId, AuthenticateError> {
        let client_id = gate
            .check_auth(user_id)
            .map_err(AuthenticateError::Rejected)?;

        let evicted = self
            .message_pusher
            .register_client(client_id.clone(), connection_id, sender)
            .await;
        if let Some(previous) = evicted {
            self.disconnect_participant
                .execute(&client_id, previous)
                .await;
        }

        gate.accept(client_id.clone());
        tracing::info!("Client '{}' authenticated ({})", client_id, connection_id);
        Ok(client_id)
    }

    /// 新しい identity を発行する
    pub fn issue_user_id(&self) -> ClientId {
        ClientId::generate()
    }
}
