//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, OUTBOUND_QUEUE_CAPACITY},
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
    usecase::ChatSession,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// 1 フレームの書き込みに許す時間（これを超える接続は切断する）
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Spawns a task that drains the outbound channel into the WebSocket sender.
///
/// Every frame the hub queues for this connection goes through here, so the
/// order of frames on the wire matches the order they were queued. The task
/// ends when the hub drops the channel or a write stalls past `WRITE_TIMEOUT`,
/// which in turn closes the connection.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let write = sender.send(Message::Text(msg.into()));
            match tokio::time::timeout(WRITE_TIMEOUT, write).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => break,
                Err(_) => {
                    tracing::warn!("WebSocket write timed out, closing connection");
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();
    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);

    let mut session = state
        .room_service
        .open_session(connection_id.clone(), tx)
        .await;
    tracing::info!("Connection '{}' opened", connection_id);

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    // 受信側はこのタスク内で逐次処理する（ハンドラの途中でキャンセルされない）
    loop {
        tokio::select! {
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        dispatch_frame(&mut session, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!("Ignoring binary frame from '{}'", connection_id);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Connection '{}' requested close", connection_id);
                        break;
                    }
                    // Ping/pong is handled automatically by the WebSocket protocol
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                        break;
                    }
                }
            }
            _ = &mut send_task => {
                tracing::debug!("Outbound stream of '{}' ended", connection_id);
                break;
            }
        }
    }

    send_task.abort();

    match session.handle_disconnect().await {
        Some(identity) => tracing::info!(
            "Connection '{}' closed, '{}' left the room",
            connection_id,
            identity.user_name.as_str()
        ),
        None => tracing::info!("Connection '{}' closed before joining", connection_id),
    }
}

/// 受信フレームを解釈してセッションの操作へ振り分ける
///
/// 解釈できないフレームや拒否された操作は送信元へ何も返さずに破棄します。
async fn dispatch_frame(session: &mut ChatSession, text: &str) {
    let request = match serde_json::from_str::<ClientMessage>(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(
                "Dropping malformed frame from '{}': {}",
                session.connection_id(),
                e
            );
            return;
        }
    };

    let result = match request {
        ClientMessage::Join { user_name } => session.handle_join(&user_name).await,
        ClientMessage::Message { text } => session.handle_message(&text).await,
        ClientMessage::Typing { is_typing } => session.handle_typing(is_typing).await,
    };

    if let Err(e) = result {
        tracing::debug!(
            "Dropping request from '{}': {}",
            session.connection_id(),
            e
        );
    }
}
