//! UseCase: ルーム共有状態の操作
//!
//! ## 排他制御
//!
//! 在室者レジストリと履歴は 1 つの `Mutex<ChatRoom>` で保護します。入室・発言・
//! 退室の処理は、共有状態の更新から BroadcastHub への配信までを同じロックの
//! 中で行います。これにより、
//!
//! - 異なる接続の処理が共有状態の読み書きを交互に行うことがない
//! - 全ての接続が同じ順序で在室者リスト・メッセージを受け取る
//! - 入室者への履歴の再送とライブ配信の間に抜けや重複が生じない
//!
//! ロックの取得順は ChatRoom → BroadcastHub 内部の接続表です。

use std::sync::Arc;

use hiroba_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    BroadcastError, BroadcastHub, ChatMessage, ChatRoom, ConnectionId, ErrorCode, Identity,
    MessageText, OutboundChannel, RateLimitConfig, RoomConfig, RoomEvent, RosterEntry, Timestamp,
    TokenBucket, UserName,
};

use super::{error::SessionError, session::ChatSession};

/// ルーム状態のスナップショット（HTTP API 用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomState {
    pub name: String,
    pub created_at: Timestamp,
    pub users: Vec<RosterEntry>,
    pub history_length: usize,
    pub history_capacity: usize,
}

/// ルームの共有コンテキスト
pub struct RoomService {
    /// 表示用のルーム名
    room_name: String,
    /// ChatRoom 集約（在室者 + 履歴）
    room: Mutex<ChatRoom>,
    /// BroadcastHub（イベント配信の抽象化）
    hub: Arc<dyn BroadcastHub>,
    /// 時刻の取得元
    clock: Arc<dyn Clock>,
    /// 接続ごとのレート制限設定
    rate_limit: RateLimitConfig,
}

impl RoomService {
    /// 新しい RoomService を作成
    pub fn new(config: RoomConfig, hub: Arc<dyn BroadcastHub>, clock: Arc<dyn Clock>) -> Self {
        let created_at = Timestamp::new(clock.now_millis());
        Self {
            room_name: config.room_name,
            room: Mutex::new(ChatRoom::new(config.history_size, created_at)),
            hub,
            clock,
            rate_limit: config.rate_limit,
        }
    }

    /// 新しい接続のセッションを開始
    ///
    /// 接続を配信対象に登録し、未入室状態のセッションを返します。
    pub async fn open_session(
        self: &Arc<Self>,
        connection_id: ConnectionId,
        channel: OutboundChannel,
    ) -> ChatSession {
        self.hub
            .register_client(connection_id.clone(), channel)
            .await;
        tracing::debug!("Session opened for connection '{}'", connection_id);
        ChatSession::new(connection_id, self.clone())
    }

    /// 接続の後始末（配信対象からの削除 + 入室済みなら退室処理）
    ///
    /// 何度呼ばれても退室通知は 1 回だけ配信されます。
    pub async fn close_connection(&self, connection_id: &ConnectionId) -> Option<Identity> {
        self.hub.unregister_client(connection_id).await;
        self.release(connection_id).await
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// ルーム状態のスナップショットを取得
    pub async fn room_state(&self) -> RoomState {
        let room = self.room.lock().await;
        RoomState {
            name: self.room_name.clone(),
            created_at: room.created_at,
            users: room.presence().snapshot(),
            history_length: room.history().len(),
            history_capacity: room.history().capacity(),
        }
    }

    pub(crate) fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    pub(crate) fn new_token_bucket(&self) -> TokenBucket {
        TokenBucket::new(self.rate_limit, self.clock.clone())
    }

    /// 入室処理
    ///
    /// 登録 → 履歴の再送（入室者のみ）→ 在室者リスト → 入室通知 の順に配信します。
    pub(crate) async fn admit(
        &self,
        connection_id: &ConnectionId,
        user_name: UserName,
    ) -> Result<Identity, SessionError> {
        let mut room = self.room.lock().await;
        let identity = Identity::mint(user_name, self.now());
        let (messages, users) = room
            .admit(connection_id.clone(), identity.clone())
            .map_err(|_| SessionError::DuplicateJoin)?;

        let history = RoomEvent::History { messages };
        self.deliver(self.hub.send_to_one(connection_id, &history).await, &history);

        let roster = RoomEvent::UserList { users };
        self.deliver(self.hub.send_to_all(&roster).await, &roster);

        let joined = RoomEvent::Joined(identity.roster_entry());
        self.deliver(self.hub.send_to_all(&joined).await, &joined);

        Ok(identity)
    }

    /// 発言処理（履歴に追加して全接続に配信）
    pub(crate) async fn publish(&self, author: &Identity, text: MessageText) -> ChatMessage {
        let mut room = self.room.lock().await;
        let message = ChatMessage::new(author, text, self.now());
        room.record(message.clone());

        let event = RoomEvent::Message(message.clone());
        self.deliver(self.hub.send_to_all(&event).await, &event);

        message
    }

    /// 入力中通知（送信者以外に配信）
    ///
    /// 共有状態に触れないため ChatRoom のロックは取りません。
    pub(crate) async fn announce_typing(
        &self,
        from: &ConnectionId,
        author: &Identity,
        is_typing: bool,
    ) {
        let event = RoomEvent::Typing {
            user: author.roster_entry(),
            is_typing,
        };
        self.deliver(self.hub.send_to_all_except(from, &event).await, &event);
    }

    /// 送信元の接続のみにエラーを通知
    pub(crate) async fn send_error(&self, to: &ConnectionId, code: ErrorCode, message: &str) {
        let event = RoomEvent::Error {
            code,
            message: message.to_string(),
        };
        self.deliver(self.hub.send_to_one(to, &event).await, &event);
    }

    /// 退室処理
    ///
    /// 在室者リスト → 退室通知 の順に残りの接続へ配信します。
    pub(crate) async fn release(&self, connection_id: &ConnectionId) -> Option<Identity> {
        let mut room = self.room.lock().await;
        let (identity, users) = room.dismiss(connection_id)?;

        let roster = RoomEvent::UserList { users };
        self.deliver(self.hub.send_to_all(&roster).await, &roster);

        let left = RoomEvent::Left(identity.roster_entry());
        self.deliver(self.hub.send_to_all(&left).await, &left);

        tracing::info!(
            "'{}' ({}) left the room",
            identity.user_name.as_str(),
            identity.user_id
        );
        Some(identity)
    }

    fn deliver(&self, result: Result<(), BroadcastError>, event: &RoomEvent) {
        if let Err(e) = result {
            tracing::warn!("Failed to deliver '{}' event: {}", event.name(), e);
        }
    }
}
