//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use hiroba_server::infrastructure::dto::websocket::{ClientMessage, ServerMessage};
use tokio::{net::TcpStream, sync::mpsc, time::Instant};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::{
    domain::TypingTracker, error::ClientError, formatter::MessageFormatter, view::ChatView,
};

use super::ui::{InputEvent, redisplay_prompt};

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Run one WebSocket client session.
///
/// Returns `Ok(())` when the user closes the input, and an error when the
/// connection drops or the server rejects the name.
pub async fn run_client_session(
    url: &str,
    user_name: &str,
    view: &mut ChatView,
    input_rx: &mut mpsc::UnboundedReceiver<InputEvent>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to chat server!");

    let (mut write, mut read) = ws_stream.split();

    send_frame(
        &mut write,
        &ClientMessage::Join {
            user_name: user_name.to_string(),
        },
    )
    .await?;

    println!(
        "\nYou are '{}'. Type messages and press Enter to send. Press Ctrl+D to exit.\n",
        user_name
    );

    let mut typing = TypingTracker::new();

    loop {
        let idle_deadline = typing.idle_deadline().map(Instant::from_std);

        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let output = match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(message) => view.render(&message)?,
                        Err(_) => Some(MessageFormatter::format_raw_message(text.as_str())),
                    };
                    if let Some(output) = output {
                        print!("{}", output);
                        redisplay_prompt(user_name);
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt(user_name);
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Server closed the connection");
                    return Err(ClientError::ConnectionError(
                        "Connection lost".to_string(),
                    ));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
            },
            _ = sleep_until_idle(idle_deadline), if idle_deadline.is_some() => {
                if typing.on_idle(std::time::Instant::now()) {
                    send_frame(&mut write, &ClientMessage::Typing { is_typing: false }).await?;
                }
            },
            input = input_rx.recv() => match input {
                Some(InputEvent::Activity) => {
                    if typing.on_activity(std::time::Instant::now()) {
                        send_frame(&mut write, &ClientMessage::Typing { is_typing: true }).await?;
                    }
                }
                Some(InputEvent::Line(text)) => {
                    send_frame(&mut write, &ClientMessage::Message { text }).await?;
                }
                None => {
                    tracing::info!("Input closed, leaving the room");
                    write.close().await.ok();
                    return Ok(());
                }
            },
        }
    }
}

async fn sleep_until_idle(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn send_frame(write: &mut WsWriter, frame: &ClientMessage) -> Result<(), ClientError> {
    let json = serde_json::to_string(frame)
        .map_err(|e| ClientError::ConnectionError(format!("Failed to serialize frame: {}", e)))?;

    write.send(Message::text(json)).await.map_err(|e| {
        tracing::warn!("Failed to send frame: {}", e);
        ClientError::ConnectionError(e.to_string())
    })
}
