//! Conversion logic between DTOs and domain models.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, RoomEvent, RosterEntry};
use crate::infrastructure::dto::{http, websocket as dto};
use crate::usecase::RoomState;

// ========================================
// Domain Model → DTO
// ========================================

impl From<RosterEntry> for dto::UserInfo {
    fn from(model: RosterEntry) -> Self {
        Self {
            user_id: model.user_id.into_string(),
            user_name: model.user_name.into_string(),
        }
    }
}

impl From<ChatMessage> for dto::MessageInfo {
    fn from(model: ChatMessage) -> Self {
        Self {
            id: model.id.into_string(),
            user_id: model.user_id.into_string(),
            user_name: model.user_name.into_string(),
            text: model.text.into_string(),
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<RoomEvent> for dto::ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::History { messages } => Self::History(dto::HistoryPayload {
                messages: messages.into_iter().map(Into::into).collect(),
            }),
            RoomEvent::UserList { users } => Self::UserList(dto::UserListPayload {
                users: users.into_iter().map(Into::into).collect(),
            }),
            RoomEvent::Joined(user) => Self::Joined(user.into()),
            RoomEvent::Left(user) => Self::Left(user.into()),
            RoomEvent::Message(message) => Self::Message(message.into()),
            RoomEvent::Typing { user, is_typing } => Self::Typing(dto::TypingInfo {
                user_id: user.user_id.into_string(),
                user_name: user.user_name.into_string(),
                is_typing,
            }),
            RoomEvent::Error { code, message } => Self::ErrorMsg(dto::ErrorInfo {
                code: code.as_str().to_string(),
                message,
            }),
        }
    }
}

impl From<RoomState> for http::RoomStateDto {
    fn from(state: RoomState) -> Self {
        Self {
            room: state.name,
            users: state.users.into_iter().map(Into::into).collect(),
            history_length: state.history_length,
            history_capacity: state.history_capacity,
            created_at: timestamp_to_rfc3339(state.created_at.value()),
        }
    }
}
