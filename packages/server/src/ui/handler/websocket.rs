//! WebSocket connection handlers.
//!
//! Each socket gets one receive loop (this module) and one writer task
//! (`pusher_loop`) draining the socket's outbound channel. Direct replies and
//! fan-out from other connections both go through that channel, so a slow
//! socket never blocks anyone else.

use std::{fmt::Display, sync::Arc};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{
        AuthGate, ClientId, ConnectionId, ErrorCode, PushFrame, PusherChannel, RoomId,
        SuccessCode,
    },
    infrastructure::dto::websocket::{
        ArchivedRoomData, ArchivedRoomListData, ClientMessage, RoomHistoryData, RoomListData,
        ServerMessage, requested_capacity,
    },
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the outbound channel into the WebSocket sink.
///
/// Ends when the channel closes, the socket fails, or a `PushFrame::Close`
/// has been written.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<PushFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                PushFrame::Text(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                PushFrame::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);
    let mut session = Session::new(state.clone(), connection_id, tx);
    tracing::info!("Connection {} opened", connection_id);

    let auth_deadline = tokio::time::sleep(state.auth_timeout);
    tokio::pin!(auth_deadline);

    loop {
        tokio::select! {
            () = &mut auth_deadline, if session.gate.is_awaiting_auth() => {
                if let Some(code) = session.gate.time_out() {
                    tracing::warn!("Connection {} did not authenticate in time", connection_id);
                    session.reply(ServerMessage::Closed { code });
                    session.close();
                }
            }
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => session.handle_text(text.as_str()).await,
                Some(Ok(Message::Binary(_))) => session.reply_error(ErrorCode::InvalidJson),
                Some(Ok(Message::Close(_))) | None => break,
                // Ping/pong is handled automatically by the WebSocket protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error on connection {}: {}", connection_id, e);
                    break;
                }
            },
            _ = &mut send_task => break,
        }
    }

    if let Some(client_id) = session.gate.close() {
        state
            .disconnect_participant_usecase
            .execute(&client_id, connection_id)
            .await;
    }
    send_task.abort();
    tracing::info!("Connection {} closed", connection_id);
}

/// Per-socket state owned by the receive loop
struct Session {
    state: Arc<AppState>,
    connection_id: ConnectionId,
    gate: AuthGate,
    tx: PusherChannel,
}

impl Session {
    fn new(state: Arc<AppState>, connection_id: ConnectionId, tx: PusherChannel) -> Self {
        Self {
            state,
            connection_id,
            gate: AuthGate::new(),
            tx,
        }
    }

    /// Queue a frame for this socket only
    fn reply(&self, message: ServerMessage) {
        match serde_json::to_string(&message) {
            Ok(text) => {
                if self.tx.send(PushFrame::Text(text)).is_err() {
                    tracing::debug!("Connection {} is gone, reply dropped", self.connection_id);
                }
            }
            Err(e) => tracing::error!("Failed to encode reply: {}", e),
        }
    }

    fn reply_error(&self, code: ErrorCode) {
        self.reply(ServerMessage::Error { code });
    }

    fn reply_success(&self, code: SuccessCode) {
        self.reply(ServerMessage::Success { code });
    }

    /// Reply with an error code, logging it at a level matching its cause
    fn reject(&self, operation: &str, code: ErrorCode, error: impl Display) {
        if code == ErrorCode::InternalError {
            tracing::error!("{} failed on connection {}: {}", operation, self.connection_id, error);
        } else {
            tracing::warn!(
                "{} rejected on connection {}: {}",
                operation,
                self.connection_id,
                code.as_str()
            );
        }
        self.reply_error(code);
    }

    fn close(&self) {
        let _ = self.tx.send(PushFrame::Close);
    }

    async fn handle_text(&mut self, text: &str) {
        tracing::debug!("Received on connection {}: {}", self.connection_id, text);
        match ClientMessage::parse(text) {
            Ok(message) => self.dispatch(message).await,
            Err(code) => self.reject("Frame", code, text.len()),
        }
    }

    async fn dispatch(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::Auth { user_id } => self.authenticate(user_id).await,
            ClientMessage::RequestUserId => {
                let user_id = self.state.authenticate_usecase.issue_user_id();
                self.reply(ServerMessage::UserIdIssued {
                    user_id: user_id.into_string(),
                });
            }
            message => match self.gate.authorize() {
                Ok(client_id) => {
                    let client_id = client_id.clone();
                    self.dispatch_authenticated(client_id, message).await;
                }
                Err(code) => self.reply_error(code),
            },
        }
    }

    async fn authenticate(&mut self, user_id: Option<String>) {
        let result = self
            .state
            .authenticate_usecase
            .execute(&mut self.gate, user_id, self.connection_id, self.tx.clone())
            .await;
        match result {
            Ok(client_id) => self.reply(ServerMessage::AuthOk {
                user_id: client_id.into_string(),
            }),
            Err(e) => self.reject("Authentication", e.code(), e),
        }
    }

    async fn dispatch_authenticated(&self, client_id: ClientId, message: ClientMessage) {
        let state = &self.state;
        match message {
            ClientMessage::GetAllRooms => match state.query_rooms_usecase.active_rooms().await {
                Ok(snapshots) => self.reply(ServerMessage::AllActiveRooms {
                    data: RoomListData {
                        rooms: snapshots.iter().map(Into::into).collect(),
                    },
                }),
                Err(e) => self.reject("getAllRooms", ErrorCode::InternalError, e),
            },
            ClientMessage::GetAllArchivedRooms => {
                match state.query_rooms_usecase.archived_rooms().await {
                    Ok(rooms) => self.reply(ServerMessage::AllArchivedRooms {
                        data: ArchivedRoomListData {
                            rooms: rooms.iter().map(Into::into).collect(),
                        },
                    }),
                    Err(e) => self.reject("getAllArchivedRooms", ErrorCode::InternalError, e),
                }
            }
            ClientMessage::GetArchivedRoom { room_id } => {
                match state
                    .query_rooms_usecase
                    .archived_room(RoomId::new(room_id))
                    .await
                {
                    Ok(archived) => self.reply(ServerMessage::ArchivedRoomData {
                        data: ArchivedRoomData {
                            room: (&archived.room).into(),
                            messages: archived.messages.iter().map(Into::into).collect(),
                        },
                    }),
                    Err(e) => self.reject("getArchivedRoom", e.code(), e),
                }
            }
            ClientMessage::JoinRoom { room_id, nickname } => {
                let room_id = RoomId::new(room_id);
                match state
                    .join_room_usecase
                    .execute(&client_id, self.connection_id, room_id, nickname)
                    .await
                {
                    Ok(history) => self.reply(ServerMessage::RoomHistory {
                        data: RoomHistoryData {
                            room_id: room_id.value(),
                            messages: history.iter().map(Into::into).collect(),
                        },
                    }),
                    Err(e) => self.reject("joinRoom", e.code(), e),
                }
            }
            ClientMessage::LeaveRoom { room_id } => {
                state
                    .leave_room_usecase
                    .execute(&client_id, self.connection_id, room_id.map(RoomId::new))
                    .await;
                self.reply_success(SuccessCode::RoomLeft);
            }
            ClientMessage::SendMessage { room_id, content } => {
                if let Err(e) = state
                    .send_message_usecase
                    .execute(&client_id, self.connection_id, RoomId::new(room_id), content)
                    .await
                {
                    self.reject("sendMessage", e.code(), e);
                }
            }
            ClientMessage::CreateRoom { name, max_clients } => {
                let max_clients = match requested_capacity(max_clients.as_ref()) {
                    Ok(max_clients) => max_clients,
                    Err(code) => return self.reject("createRoom", code, "maxClients"),
                };
                match state
                    .create_room_usecase
                    .execute(&client_id, name, max_clients)
                    .await
                {
                    Ok(snapshot) => {
                        self.reply(ServerMessage::RoomData {
                            data: (&snapshot).into(),
                        });
                        self.reply_success(SuccessCode::RoomCreated);
                    }
                    Err(e) => self.reject("createRoom", e.code(), e),
                }
            }
            ClientMessage::ArchiveRoom { room_id } => match state
                .archive_room_usecase
                .execute(&client_id, RoomId::new(room_id))
                .await
            {
                Ok(()) => self.reply_success(SuccessCode::RoomArchived),
                Err(e) => self.reject("archiveRoom", e.code(), e),
            },
            // Answered before authorization
            ClientMessage::Auth { .. } | ClientMessage::RequestUserId => {}
        }
    }
}
