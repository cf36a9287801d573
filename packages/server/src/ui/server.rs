//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::RoomService;

use super::{
    handler::{get_room_state, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat server
///
/// # Example
///
/// ```ignore
/// let room_service = Arc::new(RoomService::new(room_config, hub, clock));
/// let server = Server::new(room_service);
/// server.run("127.0.0.1".to_string(), 3000).await?;
/// ```
pub struct Server {
    /// RoomService（ルーム共有状態と配信の窓口）
    room_service: Arc<RoomService>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(room_service: Arc<RoomService>) -> Self {
        Self { room_service }
    }

    /// Build the router with every endpoint attached
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            room_service: self.room_service.clone(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/healthz", get(health_check))
            .route("/api/room", get(get_room_state))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the WebSocket chat server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener).await?;

        Ok(())
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!(
            "Chat room '{}' listening on {}",
            self.room_service.room_name(),
            listener.local_addr()?
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
