//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use roomcast_shared::time::Clock;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRelayRepository},
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, RoomNotifier, SendMessageUseCase,
    },
};

use super::{
    handler::{
        http::{get_room_detail, get_rooms, health_check},
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat-room relay server
///
/// This struct encapsulates the use cases and provides methods to build the router
/// and run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::in_memory(Arc::new(SystemClock));
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `connect_client_usecase` - UseCase for connection
    /// * `disconnect_client_usecase` - UseCase for disconnection
    /// * `join_room_usecase` - UseCase for joining a room
    /// * `leave_room_usecase` - UseCase for leaving a room
    /// * `send_message_usecase` - UseCase for message sending
    /// * `get_rooms_usecase` - UseCase for getting rooms list
    /// * `get_room_detail_usecase` - UseCase for getting room detail
    pub fn new(
        connect_client_usecase: Arc<ConnectClientUseCase>,
        disconnect_client_usecase: Arc<DisconnectClientUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    ) -> Self {
        Self {
            state: AppState {
                connect_client_usecase,
                disconnect_client_usecase,
                join_room_usecase,
                leave_room_usecase,
                send_message_usecase,
                get_rooms_usecase,
                get_room_detail_usecase,
            },
        }
    }

    /// Wire every use case against the in-memory repository and WebSocket pusher
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        // Initialize dependencies in order:
        // 1. Repository
        // 2. MessagePusher
        // 3. UseCases

        // 1. Create Repository (in-memory registry of online users and rooms)
        let repository = Arc::new(InMemoryRelayRepository::default());

        // 2. Create MessagePusher (WebSocket implementation)
        let message_pusher = Arc::new(WebSocketMessagePusher::new());

        // 3. Create UseCases
        // The notifier is shared so every membership transition is serialized
        let notifier = RoomNotifier::new(message_pusher.clone(), clock);
        Self::new(
            Arc::new(ConnectClientUseCase::new(
                repository.clone(),
                message_pusher,
            )),
            Arc::new(DisconnectClientUseCase::new(
                repository.clone(),
                notifier.clone(),
            )),
            Arc::new(JoinRoomUseCase::new(repository.clone(), notifier.clone())),
            Arc::new(LeaveRoomUseCase::new(repository.clone(), notifier.clone())),
            Arc::new(SendMessageUseCase::new(repository.clone(), notifier)),
            Arc::new(GetRoomsUseCase::new(repository.clone())),
            Arc::new(GetRoomDetailUseCase::new(repository)),
        )
    }

    /// Build the axum router with all endpoints
    pub fn router(self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::new(self.state))
    }

    /// Serve on an already-bound listener until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns an error if there's an error during server execution.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Run the relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!("Roomcast relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
