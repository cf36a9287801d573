//! BroadcastHub trait 定義
//!
//! セッションが必要とするイベント配信のインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 配信の保証
//!
//! - 各メソッドは、呼び出し時点で接続中の全宛先にイベントを渡してから戻ります
//! - 1 つの接続に対しては、呼び出し順 = 配信順
//! - 配信は best-effort（切断済みの宛先には届かない）
//! - 送信キューが満杯の接続は配信対象から外される（送信タスクが終了し切断される）

use async_trait::async_trait;
use tokio::sync::mpsc;

#[cfg(test)]
use mockall::automock;

use super::{error::BroadcastError, event::RoomEvent, value_object::ConnectionId};

/// 接続ごとの送信キューの上限（フレーム数）
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// 接続ごとの送信チャンネル（エンコード済みのフレームを運ぶ）
pub type OutboundChannel = mpsc::Sender<String>;

/// Fan-out of room events to connections
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BroadcastHub: Send + Sync {
    /// 接続を配信対象に追加
    async fn register_client(&self, connection_id: ConnectionId, channel: OutboundChannel);

    /// 接続を配信対象から削除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 全接続に配信
    async fn send_to_all(&self, event: &RoomEvent) -> Result<(), BroadcastError>;

    /// 指定した接続以外の全接続に配信
    async fn send_to_all_except(
        &self,
        excluded: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), BroadcastError>;

    /// 指定した接続のみに配信
    async fn send_to_one(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), BroadcastError>;
}
