//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 認証済み接続の `UnboundedSender` を identity ごとに 1 つだけ管理
//! - `Notification` を JSON フレームに変換して送信（push_to, broadcast）
//! - 同一 identity の再接続時に古い接続を追い出す
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//!
//! ブロードキャストはロック中に送信先の sender を複製し、ロック解放後に送信します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ClientId, ConnectionId, ErrorCode, MessagePushError, MessagePusher, Notification, PushFrame,
    PusherChannel,
};
use crate::infrastructure::dto::websocket::ServerMessage;

/// 登録済み接続
struct Registration {
    connection_id: ConnectionId,
    sender: PusherChannel,
}

/// WebSocket を使った MessagePusher 実装
///
/// Key: client_id (String)
#[derive(Default)]
pub struct WebSocketMessagePusher {
    clients: Mutex<HashMap<String, Registration>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済みの接続数
    #[cfg(test)]
    pub(crate) async fn connected_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// `connection_id` が `client_id` の現在の接続か
    #[cfg(test)]
    pub(crate) async fn is_current(
        &self,
        client_id: &ClientId,
        connection_id: ConnectionId,
    ) -> bool {
        self.clients
            .lock()
            .await
            .get(client_id.as_str())
            .is_some_and(|registration| registration.connection_id == connection_id)
    }
}

/// `Notification` を送信用テキストフレームに変換
pub fn encode(notification: &Notification) -> Result<PushFrame, MessagePushError> {
    let message = ServerMessage::from(notification);
    serde_json::to_string(&message)
        .map(PushFrame::Text)
        .map_err(|e| MessagePushError::EncodeFailed(e.to_string()))
}

/// 複製した sender 群に送信する。失敗は警告ログのみ
fn fan_out(targets: Vec<(String, PusherChannel)>, frame: &PushFrame) {
    for (client_id, sender) in targets {
        if let Err(e) = sender.send(frame.clone()) {
            tracing::warn!("Failed to push message to client '{}': {}", client_id, e);
        } else {
            tracing::debug!("Broadcasted message to client '{}'", client_id);
        }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(
        &self,
        client_id: ClientId,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Option<ConnectionId> {
        let previous = {
            let mut clients = self.clients.lock().await;
            clients.insert(
                client_id.as_str().to_string(),
                Registration {
                    connection_id,
                    sender,
                },
            )
        };
        tracing::debug!(
            "Client '{}' registered to MessagePusher ({})",
            client_id,
            connection_id
        );

        let previous = previous?;
        if previous.connection_id == connection_id {
            return None;
        }

        tracing::info!(
            "Client '{}' reconnected, evicting connection {}",
            client_id,
            previous.connection_id
        );
        match encode(&Notification::Closed(ErrorCode::DuplicateConnection)) {
            Ok(frame) => {
                let _ = previous.sender.send(frame);
            }
            Err(e) => tracing::error!("{}", e),
        }
        let _ = previous.sender.send(PushFrame::Close);
        Some(previous.connection_id)
    }

    async fn unregister_client(&self, client_id: &ClientId, connection_id: ConnectionId) -> bool {
        let mut clients = self.clients.lock().await;
        let owned = clients
            .get(client_id.as_str())
            .is_some_and(|registration| registration.connection_id == connection_id);
        if owned {
            clients.remove(client_id.as_str());
            tracing::debug!("Client '{}' unregistered from MessagePusher", client_id);
        }
        owned
    }

    async fn push_to(
        &self,
        client_id: &ClientId,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let frame = encode(notification)?;
        let sender = {
            let clients = self.clients.lock().await;
            clients
                .get(client_id.as_str())
                .map(|registration| registration.sender.clone())
        };

        let sender =
            sender.ok_or_else(|| MessagePushError::ClientNotFound(client_id.to_string()))?;
        sender
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to client '{}'", client_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ClientId>,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let frame = encode(notification)?;
        let senders: Vec<(String, PusherChannel)> = {
            let clients = self.clients.lock().await;
            targets
                .into_iter()
                .filter_map(|target| match clients.get(target.as_str()) {
                    Some(registration) => {
                        Some((target.into_string(), registration.sender.clone()))
                    }
                    None => {
                        tracing::warn!(
                            "Client '{}' not found during broadcast, skipping",
                            target
                        );
                        None
                    }
                })
                .collect()
        };

        fan_out(senders, &frame);
        Ok(())
    }

    async fn broadcast_all(&self, notification: &Notification) -> Result<(), MessagePushError> {
        let frame = encode(notification)?;
        let senders: Vec<(String, PusherChannel)> = {
            let clients = self.clients.lock().await;
            clients
                .iter()
                .map(|(client_id, registration)| (client_id.clone(), registration.sender.clone()))
                .collect()
        };

        fan_out(senders, &frame);
        Ok(())
    }
}
