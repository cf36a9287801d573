//! UseCase: 接続ごとのチャットセッション
//!
//! ## 状態遷移
//!
//! ```text
//! Unregistered --join(成功)--> Registered --disconnect--> (破棄)
//! ```
//!
//! `Registered` から `Unregistered` に戻ることはありません。切断処理
//! (`handle_disconnect`) はセッションを消費するため、切断後のセッションを
//! 使うことはできません。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ErrorCode, Identity, MessageText, Timestamp, TokenBucket, UserName,
};

use super::{error::SessionError, room_service::RoomService};

/// 入力中通知の最小送信間隔（ミリ秒）
pub const TYPING_THROTTLE_MS: i64 = 1000;

/// 名前が不正な場合に返すメッセージ
pub const INVALID_NAME_MESSAGE: &str = "Name must be 1-20 characters.";

#[derive(Debug)]
enum SessionState {
    Unregistered,
    Registered(Identity),
    /// 切断処理済み
    Closed,
}

/// Per-connection session
pub struct ChatSession {
    connection_id: ConnectionId,
    state: SessionState,
    limiter: TokenBucket,
    last_typing_sent_at: Option<Timestamp>,
    service: Arc<RoomService>,
}

impl ChatSession {
    pub(crate) fn new(connection_id: ConnectionId, service: Arc<RoomService>) -> Self {
        Self {
            connection_id,
            state: SessionState::Unregistered,
            limiter: service.new_token_bucket(),
            last_typing_sent_at: None,
            service,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// 入室済みなら Identity を返す
    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::Registered(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.identity().is_some()
    }

    /// join 要求
    ///
    /// 名前が不正な場合は送信元に `INVALID_NAME` を返し、未入室のままです。
    pub async fn handle_join(&mut self, requested_name: &str) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Unregistered) {
            return Err(SessionError::DuplicateJoin);
        }

        let user_name = match UserName::parse(requested_name) {
            Ok(name) => name,
            Err(e) => {
                self.service
                    .send_error(
                        &self.connection_id,
                        ErrorCode::InvalidName,
                        INVALID_NAME_MESSAGE,
                    )
                    .await;
                return Err(SessionError::Validation(e));
            }
        };

        let identity = self.service.admit(&self.connection_id, user_name).await?;
        tracing::info!(
            "Connection '{}' joined as '{}' ({})",
            self.connection_id,
            identity.user_name.as_str(),
            identity.user_id
        );
        self.state = SessionState::Registered(identity);
        Ok(())
    }

    /// message 要求
    ///
    /// レート制限超過・長さ不正はいずれも送信元に通知せず破棄します。
    /// トークンは検証の前に消費されます。
    pub async fn handle_message(&mut self, raw_text: &str) -> Result<(), SessionError> {
        let SessionState::Registered(identity) = &self.state else {
            return Err(SessionError::UnregisteredAction);
        };
        if !self.limiter.try_consume(1.0) {
            return Err(SessionError::RateLimitExceeded);
        }
        let text = MessageText::parse(raw_text)?;

        let message = self.service.publish(identity, text).await;
        tracing::debug!(
            "Accepted message '{}' from '{}'",
            message.id,
            identity.user_name.as_str()
        );
        Ok(())
    }

    /// typing 要求
    ///
    /// 受信頻度に関わらず、送信は `TYPING_THROTTLE_MS` に 1 回までです。
    pub async fn handle_typing(&mut self, is_typing: bool) -> Result<(), SessionError> {
        let SessionState::Registered(identity) = &self.state else {
            return Err(SessionError::UnregisteredAction);
        };
        let now = self.service.now();
        if let Some(last) = self.last_typing_sent_at
            && now.value() - last.value() < TYPING_THROTTLE_MS
        {
            return Err(SessionError::TypingThrottled);
        }
        self.last_typing_sent_at = Some(now);

        self.service
            .announce_typing(&self.connection_id, identity, is_typing)
            .await;
        Ok(())
    }

    /// 切断
    ///
    /// 入室済みであれば退室処理を行い、その Identity を返します。
    /// 未入室の接続は誰にも見えていないため、何も配信しません。
    pub async fn handle_disconnect(mut self) -> Option<Identity> {
        self.state = SessionState::Closed;
        self.service.close_connection(&self.connection_id).await
    }
}

impl Drop for ChatSession {
    /// `handle_disconnect` を経ずに破棄された場合（タスクの panic など）の後始末
    fn drop(&mut self) {
        if matches!(self.state, SessionState::Closed) {
            return;
        }
        let connection_id = self.connection_id.clone();
        let service = self.service.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(
                    "Session '{}' dropped without disconnect, releasing",
                    connection_id
                );
                handle.spawn(async move {
                    service.close_connection(&connection_id).await;
                });
            }
            Err(_) => {
                tracing::warn!(
                    "Session '{}' dropped outside of a runtime, cannot release",
                    connection_id
                );
            }
        }
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("connection_id", &self.connection_id)
            .field("state", &self.state)
            .field("limiter", &self.limiter)
            .field("last_typing_sent_at", &self.last_typing_sent_at)
            .finish()
    }
}
