//! Broadcaster: ルーム状態と全ルーム一覧のファンアウト
//!
//! スナップショットは送信の直前に RoomRepository と PresenceRepository から
//! 読み直します。アーカイブ済みのルームは一覧にも `roomData` にも含めません。
//! 配信は best-effort で、失敗はログに残して処理を続けます。

use std::sync::Arc;

use crate::domain::{
    ClientId, MessagePusher, Notification, PresenceRepository, RepositoryError, Room, RoomId,
    RoomRepository, RoomSnapshot,
};

/// ルーム参加者向け・全接続向けの通知を組み立てて送る
pub struct Broadcaster {
    rooms: Arc<dyn RoomRepository>,
    presence: Arc<dyn PresenceRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl Broadcaster {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        presence: Arc<dyn PresenceRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            rooms,
            presence,
            message_pusher,
        }
    }

    /// 現在の参加者数を付けたスナップショット
    pub async fn snapshot(&self, room: Room) -> RoomSnapshot {
        let participant_count = self.presence.count(room.id).await;
        RoomSnapshot {
            room,
            participant_count,
        }
    }

    /// アクティブなルームのスナップショット一覧（ID 順）
    pub async fn active_snapshots(&self) -> Result<Vec<RoomSnapshot>, RepositoryError> {
        let rooms = self.rooms.list_active_rooms().await?;
        let mut snapshots = Vec::with_capacity(rooms.len());
        for room in rooms {
            snapshots.push(self.snapshot(room).await);
        }
        Ok(snapshots)
    }

    /// ルームの参加者全員に `roomData` と `roomConnectedClients` を送る
    pub async fn broadcast_room(&self, room_id: RoomId) {
        let room = match self.rooms.find_room(room_id).await {
            Ok(Some(room)) if !room.archived => room,
            Ok(_) => return,
            Err(e) => {
                tracing::error!("Failed to load room {} for broadcast: {}", room_id, e);
                return;
            }
        };

        let participants = self.presence.participants(room_id).await;
        let targets: Vec<ClientId> = participants
            .iter()
            .map(|participant| participant.client_id.clone())
            .collect();
        let snapshot = RoomSnapshot {
            room,
            participant_count: participants.len(),
        };

        for notification in [
            Notification::RoomState(snapshot),
            Notification::RoomParticipants {
                room_id,
                participants,
            },
        ] {
            if let Err(e) = self
                .message_pusher
                .broadcast(targets.clone(), &notification)
                .await
            {
                tracing::warn!("Failed to broadcast state of room {}: {}", room_id, e);
            }
        }
    }

    /// 認証済みの全接続に `allActiveRooms` を送る
    pub async fn broadcast_active_rooms(&self) {
        let snapshots = match self.active_snapshots().await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                tracing::error!("Failed to list active rooms for broadcast: {}", e);
                return;
            }
        };

        if let Err(e) = self
            .message_pusher
            .broadcast_all(&Notification::ActiveRooms(snapshots))
            .await
        {
            tracing::warn!("Failed to broadcast active rooms: {}", e);
        }
    }
}
