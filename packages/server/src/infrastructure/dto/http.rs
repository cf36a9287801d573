//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::UserInfo;

/// Liveness probe response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub ok: bool,
    pub room: String,
}

/// Room snapshot response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateDto {
    pub room: String,
    pub users: Vec<UserInfo>,
    pub history_length: usize,
    pub history_capacity: usize,
    /// RFC 3339
    pub created_at: String,
}
