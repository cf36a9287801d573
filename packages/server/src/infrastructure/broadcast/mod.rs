//! イベント配信（BroadcastHub）の実装
//!
//! - `websocket`: 接続ごとの送信チャンネルを使った実装

pub mod websocket;

pub use websocket::WebSocketBroadcastHub;
