//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{HealthDto, RoomStateDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        ok: true,
        room: state.room_service.room_name().to_string(),
    })
}

/// Current roster and history occupancy of the room
pub async fn get_room_state(State(state): State<Arc<AppState>>) -> Json<RoomStateDto> {
    let room = state.room_service.room_state().await;

    // Domain Model から DTO への変換
    Json(RoomStateDto::from(room))
}
