//! Server wiring and execution.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use parlor_shared::time::{Clock, SystemClock};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{
            InMemoryActivityRepository, InMemoryPresenceRepository, InMemoryRoomRepository,
        },
    },
    usecase::{
        ArchiveRoomUseCase, AuthenticateUseCase, Broadcaster, CreateRoomUseCase,
        DisconnectParticipantUseCase, JoinRoomUseCase, LeaveRoomUseCase, QueryRoomsUseCase,
        SendMessageUseCase, SweepInactiveRoomsUseCase,
    },
};

use super::{
    handler::{
        get_active_rooms, get_archived_room, get_archived_rooms, health_check, websocket_handler,
    },
    scheduler::spawn_archival_ticker,
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat relay server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(ServerConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
    /// SweepInactiveRoomsUseCase（TTL スイープのユースケース）
    sweep_inactive_rooms_usecase: Arc<SweepInactiveRoomsUseCase>,
}

impl Server {
    /// Create a server backed by in-memory stores and the system clock
    pub fn new(config: ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a server reading "now" from `clock`
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        // Initialize dependencies in order:
        // 1. Repositories
        // 2. MessagePusher
        // 3. UseCases
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let presence = Arc::new(InMemoryPresenceRepository::new());
        let activity = Arc::new(InMemoryActivityRepository::new());

        let message_pusher = Arc::new(WebSocketMessagePusher::new());

        let broadcaster = Arc::new(Broadcaster::new(
            rooms.clone(),
            presence.clone(),
            message_pusher.clone(),
        ));
        let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
            presence.clone(),
            activity.clone(),
            message_pusher.clone(),
            broadcaster.clone(),
            clock.clone(),
        ));
        let authenticate_usecase = Arc::new(AuthenticateUseCase::new(
            message_pusher.clone(),
            disconnect_participant_usecase.clone(),
        ));
        let join_room_usecase = Arc::new(JoinRoomUseCase::new(
            rooms.clone(),
            presence.clone(),
            activity.clone(),
            broadcaster.clone(),
            clock.clone(),
            config.history_limit,
            config.exclusive_rooms,
        ));
        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
            presence.clone(),
            activity.clone(),
            broadcaster.clone(),
            clock.clone(),
        ));
        let send_message_usecase = Arc::new(SendMessageUseCase::new(
            rooms.clone(),
            presence.clone(),
            activity.clone(),
            message_pusher.clone(),
            clock.clone(),
        ));
        let create_room_usecase = Arc::new(CreateRoomUseCase::new(
            rooms.clone(),
            activity.clone(),
            broadcaster.clone(),
            clock.clone(),
        ));
        let archive_room_usecase = Arc::new(ArchiveRoomUseCase::new(
            rooms.clone(),
            presence,
            activity.clone(),
            message_pusher,
            broadcaster.clone(),
        ));
        let query_rooms_usecase = Arc::new(QueryRoomsUseCase::new(rooms, broadcaster));
        let sweep_inactive_rooms_usecase = Arc::new(SweepInactiveRoomsUseCase::new(
            activity,
            archive_room_usecase.clone(),
            clock,
            config.room_ttl_millis(),
        ));

        let state = Arc::new(AppState {
            authenticate_usecase,
            disconnect_participant_usecase,
            join_room_usecase,
            leave_room_usecase,
            send_message_usecase,
            create_room_usecase,
            archive_room_usecase,
            query_rooms_usecase,
            auth_timeout: config.auth_timeout,
        });

        Self {
            config,
            state,
            sweep_inactive_rooms_usecase,
        }
    }

    /// Router with every endpoint
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_active_rooms))
            .route("/api/archive/rooms", get(get_archived_rooms))
            .route("/api/archive/rooms/{room_id}", get(get_archived_room))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to the configured address and serve until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address
    /// or if there's an error during server execution.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        let app = self.router();
        let ticker = spawn_archival_ticker(
            self.sweep_inactive_rooms_usecase.clone(),
            self.config.sweep_interval,
        );

        tracing::info!("Chat relay listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}/ws", local_addr);
        tracing::info!(
            "Rooms are archived after {:?} of inactivity (sweep every {:?})",
            self.config.room_ttl,
            self.config.sweep_interval
        );

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;
        ticker.abort();

        tracing::info!("Server shutdown complete");
        result
    }
}
