//! Client-side interpretation of server frames.
//!
//! The server mints a fresh user id on every join, so the view remembers every
//! id this client has held across reconnects in order to mark its own
//! messages in replayed history.

use hiroba_server::{domain::ErrorCode, infrastructure::dto::websocket::ServerMessage};

use crate::{error::ClientError, formatter::MessageFormatter};

#[derive(Debug, Default)]
pub struct ChatView {
    own_user_ids: Vec<String>,
    /// `history` を受信してから自分の `joined` を受信するまでの間
    awaiting_own_join: bool,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在の接続で割り当てられた user id
    pub fn current_user_id(&self) -> Option<&str> {
        if self.awaiting_own_join {
            return None;
        }
        self.own_user_ids.last().map(String::as_str)
    }

    /// Render a frame for display.
    ///
    /// `history` is sent only to the joining connection and the server emits
    /// `history`, `userlist` and `joined` for one join without interleaving
    /// other joins, so the first `joined` after `history` is this client's.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidName` when the server rejected the name.
    pub fn render(&mut self, message: &ServerMessage) -> Result<Option<String>, ClientError> {
        let rendered = match message {
            ServerMessage::History(payload) => {
                self.awaiting_own_join = true;
                Some(MessageFormatter::format_history(
                    &payload.messages,
                    &self.own_user_ids,
                ))
            }
            ServerMessage::UserList(payload) => Some(MessageFormatter::format_user_list(
                &payload.users,
                &self.own_user_ids,
            )),
            ServerMessage::Joined(user) => {
                let is_me = self.awaiting_own_join;
                if is_me {
                    self.awaiting_own_join = false;
                    self.own_user_ids.push(user.user_id.clone());
                }
                Some(MessageFormatter::format_joined(user, is_me))
            }
            ServerMessage::Left(user) => Some(MessageFormatter::format_left(user)),
            ServerMessage::Message(info) => {
                let is_mine = self.own_user_ids.contains(&info.user_id);
                Some(MessageFormatter::format_chat_message(info, is_mine))
            }
            ServerMessage::Typing(info) => {
                MessageFormatter::format_typing(&info.user_name, info.is_typing)
            }
            ServerMessage::ErrorMsg(error) if error.code == ErrorCode::InvalidName.as_str() => {
                return Err(ClientError::InvalidName(error.message.clone()));
            }
            ServerMessage::ErrorMsg(error) => Some(MessageFormatter::format_error(error)),
        };

        Ok(rendered)
    }
}
