//! WebSocket を使った BroadcastHub 実装
//!
//! ## 責務
//!
//! - 接続ごとの `OutboundChannel`（容量付きの `Sender`）を管理
//! - 送信キューが満杯・閉じている接続を配信対象から外す
//! - ドメインイベントを JSON フレームにエンコードし、宛先に送信
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui::handler::websocket`）で行われます。
//! この実装は生成された sender を受け取り、フレームの送信に使用します。
//! 各接続の sender は 1 つの送信タスクが順に WebSocket へ書き出すため、
//! このハブへの呼び出し順がそのまま各接続での受信順になります。
//!
//! イベントは 1 回の呼び出しにつき 1 度だけエンコードします。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::{
    domain::{BroadcastError, BroadcastHub, ConnectionId, OutboundChannel, RoomEvent},
    infrastructure::dto::websocket::ServerMessage,
};

/// WebSocket を使った BroadcastHub 実装
///
/// ## 使用例
///
/// ```ignore
/// let hub = WebSocketBroadcastHub::new();
/// hub.register_client(connection_id.clone(), tx).await;
///
/// // 全接続に送信
/// hub.send_to_all(&RoomEvent::Joined(entry)).await?;
/// ```
#[derive(Debug, Default)]
pub struct WebSocketBroadcastHub {
    /// 接続中のクライアントの送信チャンネル
    ///
    /// Key: ConnectionId
    /// Value: OutboundChannel
    clients: Mutex<HashMap<ConnectionId, OutboundChannel>>,
}

impl WebSocketBroadcastHub {
    /// 新しい WebSocketBroadcastHub を作成
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(event: &RoomEvent) -> Result<String, BroadcastError> {
        let frame = ServerMessage::from(event.clone());
        serde_json::to_string(&frame).map_err(|e| BroadcastError::Encode(e.to_string()))
    }

    /// `excluded` 以外の全接続に送信（一部の送信失敗は許容）
    ///
    /// 送信キューが満杯、または閉じている接続は配信対象から外します。
    /// sender が破棄されることで、その接続の送信タスクは残りを送り終えて終了します。
    async fn fan_out(
        &self,
        excluded: Option<&ConnectionId>,
        event: &RoomEvent,
    ) -> Result<(), BroadcastError> {
        let frame = Self::encode(event)?;
        let mut clients = self.clients.lock().await;

        let mut delivered = 0usize;
        let mut evicted = Vec::new();
        for (connection_id, sender) in clients.iter() {
            if Some(connection_id) == excluded {
                continue;
            }
            match sender.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to push '{}' to connection '{}': {}",
                        event.name(),
                        connection_id,
                        e
                    );
                    evicted.push(connection_id.clone());
                }
            }
        }
        for connection_id in evicted {
            clients.remove(&connection_id);
            tracing::warn!("Connection '{}' evicted from BroadcastHub", connection_id);
        }
        tracing::debug!(
            "Broadcasted '{}' to {} connection(s)",
            event.name(),
            delivered
        );

        Ok(())
    }
}

#[async_trait]
impl BroadcastHub for WebSocketBroadcastHub {
    async fn register_client(&self, connection_id: ConnectionId, channel: OutboundChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to BroadcastHub", connection_id);
        clients.insert(connection_id, channel);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(connection_id).is_some() {
            tracing::debug!(
                "Connection '{}' unregistered from BroadcastHub",
                connection_id
            );
        }
    }

    async fn send_to_all(&self, event: &RoomEvent) -> Result<(), BroadcastError> {
        self.fan_out(None, event).await
    }

    async fn send_to_all_except(
        &self,
        excluded: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), BroadcastError> {
        self.fan_out(Some(excluded), event).await
    }

    async fn send_to_one(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), BroadcastError> {
        let frame = Self::encode(event)?;
        let mut clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| BroadcastError::ClientNotFound(connection_id.to_string()))?;
        match sender.try_send(frame) {
            Ok(()) => {
                tracing::debug!("Pushed '{}' to connection '{}'", event.name(), connection_id);
                Ok(())
            }
            Err(e) => {
                let reason = match e {
                    TrySendError::Full(_) => "outbound queue is full",
                    TrySendError::Closed(_) => "outbound channel is closed",
                };
                clients.remove(connection_id);
                tracing::warn!("Connection '{}' evicted from BroadcastHub", connection_id);
                Err(BroadcastError::PushFailed(reason.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, OUTBOUND_QUEUE_CAPACITY, Timestamp, UserName};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - send_to_one: 特定の接続への送信
    // - send_to_all / send_to_all_except: 複数接続への送信
    // - エラーハンドリング（存在しない接続、閉じたチャンネル）
    //
    // 【どのようなシナリオをテストするか】
    // 1. send_to_one の成功・失敗
    // 2. send_to_all が全接続に届く
    // 3. send_to_all_except が除外した接続に届かない
    // 4. 閉じたチャンネルがあっても他の接続には届く
    // ========================================

    fn joined_event(name: &str) -> RoomEvent {
        let identity = Identity::mint(UserName::parse(name).unwrap(), Timestamp::new(0));
        RoomEvent::Joined(identity.roster_entry())
    }

    async fn register(
        hub: &WebSocketBroadcastHub,
    ) -> (ConnectionId, mpsc::Receiver<String>) {
        register_with_capacity(hub, OUTBOUND_QUEUE_CAPACITY).await
    }

    async fn register_with_capacity(
        hub: &WebSocketBroadcastHub,
        capacity: usize,
    ) -> (ConnectionId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        let connection_id = ConnectionId::generate();
        hub.register_client(connection_id.clone(), tx).await;
        (connection_id, rx)
    }

    #[tokio::test]
    async fn test_send_to_one_success() {
        // テスト項目: 特定の接続にフレームを送信できる
        // given (前提条件):
        let hub = WebSocketBroadcastHub::new();
        let (alice, mut alice_rx) = register(&hub).await;
        let (_bob, mut bob_rx) = register(&hub).await;

        // when (操作):
        let result = hub.send_to_one(&alice, &joined_event("Alice")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let frame: serde_json::Value =
            serde_json::from_str(&alice_rx.recv().await.unwrap()).unwrap();
        assert_eq!(frame["type"], "joined");
        assert_eq!(frame["userName"], "Alice");
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_to_one_client_not_found() {
        // テスト項目: 存在しない接続への送信はエラーを返す
        // given (前提条件):
        let hub = WebSocketBroadcastHub::new();

        // when (操作):
        let result = hub
            .send_to_one(&ConnectionId::generate(), &joined_event("Alice"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(BroadcastError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_send_to_all_reaches_every_connection() {
        // テスト項目: 全接続にフレームが届く
        // given (前提条件):
        let hub = WebSocketBroadcastHub::new();
        let (_alice, mut alice_rx) = register(&hub).await;
        let (_bob, mut bob_rx) = register(&hub).await;

        // when (操作):
        let result = hub.send_to_all(&joined_event("Carol")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(alice_rx.recv().await.unwrap().contains("Carol"));
        assert!(bob_rx.recv().await.unwrap().contains("Carol"));
    }

    #[tokio::test]
    async fn test_send_to_all_except_skips_excluded_connection() {
        // テスト項目: 除外した接続にはフレームが届かない
        // given (前提条件):
        let hub = WebSocketBroadcastHub::new();
        let (alice, mut alice_rx) = register(&hub).await;
        let (_bob, mut bob_rx) = register(&hub).await;

        // when (操作):
        let result = hub
            .send_to_all_except(&alice, &joined_event("Alice"))
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(alice_rx.try_recv().is_err());
        assert!(bob_rx.recv().await.unwrap().contains("Alice"));
    }

    #[tokio::test]
    async fn test_send_to_all_tolerates_closed_channel() {
        // テスト項目: 閉じたチャンネルがあっても他の接続への配信は成功する
        // given (前提条件):
        let hub = WebSocketBroadcastHub::new();
        let (_gone, gone_rx) = register(&hub).await;
        let (_alice, mut alice_rx) = register(&hub).await;
        drop(gone_rx);

        // when (操作):
        let result = hub.send_to_all(&joined_event("Bob")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(alice_rx.recv().await.unwrap().contains("Bob"));
    }

    #[tokio::test]
    async fn test_unregister_client() {
        // テスト項目: 配信対象から削除した接続には届かない
        // given (前提条件):
        let hub = WebSocketBroadcastHub::new();
        let (alice, mut alice_rx) = register(&hub).await;

        // when (操作):
        hub.unregister_client(&alice).await;
        hub.send_to_all(&joined_event("Bob")).await.unwrap();

        // then (期待する結果):
        assert!(alice_rx.recv().await.is_none());
        let result = hub.send_to_one(&alice, &joined_event("Bob")).await;
        assert!(matches!(result, Err(BroadcastError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_full_queue_evicts_connection() {
        // テスト項目: 送信キューが満杯の接続は配信対象から外され、他の接続には届き続ける
        // given (前提条件): 読み出さない接続（容量 1）と通常の接続
        let hub = WebSocketBroadcastHub::new();
        let (stalled, mut stalled_rx) = register_with_capacity(&hub, 1).await;
        let (_alice, mut alice_rx) = register(&hub).await;

        // when (操作):
        hub.send_to_all(&joined_event("Bob")).await.unwrap();
        hub.send_to_all(&joined_event("Carol")).await.unwrap();
        hub.send_to_all(&joined_event("Dave")).await.unwrap();

        // then (期待する結果): 満杯になる前の 1 件だけが届き、その後チャンネルは閉じる
        assert!(stalled_rx.recv().await.unwrap().contains("Bob"));
        assert!(stalled_rx.recv().await.is_none());
        let result = hub.send_to_one(&stalled, &joined_event("Eve")).await;
        assert!(matches!(result, Err(BroadcastError::ClientNotFound(_))));
        for name in ["Bob", "Carol", "Dave"] {
            assert!(alice_rx.recv().await.unwrap().contains(name));
        }
    }

    #[tokio::test]
    async fn test_send_to_one_full_queue_fails_and_evicts() {
        // テスト項目: 満杯の接続への個別送信はエラーを返し、配信対象から外される
        // given (前提条件):
        let hub = WebSocketBroadcastHub::new();
        let (alice, mut alice_rx) = register_with_capacity(&hub, 1).await;
        hub.send_to_one(&alice, &joined_event("Bob")).await.unwrap();

        // when (操作):
        let result = hub.send_to_one(&alice, &joined_event("Carol")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(BroadcastError::PushFailed(_))));
        assert!(alice_rx.recv().await.unwrap().contains("Bob"));
        assert!(alice_rx.recv().await.is_none());
    }
}
