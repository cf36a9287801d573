//! UseCase 層
//!
//! - `RoomService`: ルーム全体で共有される状態と排他制御
//! - `ChatSession`: 接続ごとの状態機械（未入室 → 入室済み）

pub mod error;
pub mod room_service;
pub mod session;

pub use error::SessionError;
pub use room_service::{RoomService, RoomState};
pub use session::{ChatSession, INVALID_NAME_MESSAGE, TYPING_THROTTLE_MS};
