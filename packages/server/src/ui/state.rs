//! Server state shared by every handler.

use std::sync::Arc;

use crate::usecase::RoomService;

/// Shared application state
pub struct AppState {
    /// RoomService（ルーム共有状態と配信の窓口）
    pub room_service: Arc<RoomService>,
}
