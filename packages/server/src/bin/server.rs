//! Hiroba chat relay server.
//!
//! Hosts a single chat room. Clients connect over WebSocket at `/ws`.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --room-name Lobby
//! ROOM_NAME=Lobby HISTORY_SIZE=50 cargo run --bin hiroba-server
//! ```

use std::sync::Arc;

use clap::Parser;
use hiroba_server::{
    config::ServerConfig, infrastructure::broadcast::WebSocketBroadcastHub, ui::Server,
    usecase::RoomService,
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::parse();
    let room_config = config.room_config();
    tracing::debug!("Loaded configuration: {:?}", room_config);

    // Initialize dependencies in order:
    // 1. Clock
    // 2. BroadcastHub
    // 3. RoomService
    // 4. Server
    let clock = Arc::new(SystemClock);
    let hub = Arc::new(WebSocketBroadcastHub::new());
    let room_service = Arc::new(RoomService::new(room_config, hub, clock));
    tracing::info!("Room '{}' created!", room_service.room_name());

    let server = Server::new(room_service);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
