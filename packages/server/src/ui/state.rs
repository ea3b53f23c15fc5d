//! Shared application state.

use std::{sync::Arc, time::Duration};

use crate::usecase::{
    ArchiveRoomUseCase, AuthenticateUseCase, CreateRoomUseCase, DisconnectParticipantUseCase,
    JoinRoomUseCase, LeaveRoomUseCase, QueryRoomsUseCase, SendMessageUseCase,
};

/// State handed to every axum handler
pub struct AppState {
    /// AuthenticateUseCase（認証のユースケース）
    pub authenticate_usecase: Arc<AuthenticateUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// ArchiveRoomUseCase（ルームアーカイブのユースケース）
    pub archive_room_usecase: Arc<ArchiveRoomUseCase>,
    /// QueryRoomsUseCase（ルーム参照のユースケース）
    pub query_rooms_usecase: Arc<QueryRoomsUseCase>,
    /// 認証を待つ時間
    pub auth_timeout: Duration,
}
