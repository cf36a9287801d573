//! ChatRoom 集約
//!
//! 在室者レジストリとメッセージ履歴をまとめて保持します。起動時に 1 度だけ
//! 生成され、`RoomService` が排他制御を行った上で各セッションから利用されます。

use super::{
    entity::{ChatMessage, Identity, RosterEntry},
    error::PresenceError,
    history::{DEFAULT_HISTORY_SIZE, HistoryLog},
    presence::PresenceRegistry,
    rate_limiter::RateLimitConfig,
    value_object::{ConnectionId, Timestamp},
};

/// Default display label of the room
pub const DEFAULT_ROOM_NAME: &str = "Public Room";

/// ルームの設定（プロセス設定から注入される）
#[derive(Debug, Clone, PartialEq)]
pub struct RoomConfig {
    /// 表示用のルーム名（コアの動作には影響しない）
    pub room_name: String,
    /// 保持する履歴の件数
    pub history_size: usize,
    /// 接続ごとのレート制限
    pub rate_limit: RateLimitConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            room_name: DEFAULT_ROOM_NAME.to_string(),
            history_size: DEFAULT_HISTORY_SIZE,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Shared state of the single chat room
#[derive(Debug)]
pub struct ChatRoom {
    pub created_at: Timestamp,
    presence: PresenceRegistry,
    history: HistoryLog,
}

impl ChatRoom {
    pub fn new(history_size: usize, created_at: Timestamp) -> Self {
        Self {
            created_at,
            presence: PresenceRegistry::new(),
            history: HistoryLog::new(history_size),
        }
    }

    /// 参加者を登録し、入室者に渡す履歴と更新後の在室者リストを返す
    pub fn admit(
        &mut self,
        connection_id: ConnectionId,
        identity: Identity,
    ) -> Result<(Vec<ChatMessage>, Vec<RosterEntry>), PresenceError> {
        self.presence.register(connection_id, identity)?;
        Ok((self.history.snapshot(), self.presence.snapshot()))
    }

    /// 参加者を削除し、削除した Identity と更新後の在室者リストを返す
    pub fn dismiss(&mut self, connection_id: &ConnectionId) -> Option<(Identity, Vec<RosterEntry>)> {
        let identity = self.presence.unregister(connection_id)?;
        Some((identity, self.presence.snapshot()))
    }

    /// 受理したメッセージを履歴に追加
    pub fn record(&mut self, message: ChatMessage) {
        self.history.append(message);
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }
}
