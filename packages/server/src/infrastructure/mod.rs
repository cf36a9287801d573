//! Infrastructure 層
//!
//! - `dto`: ワイヤ形式（WebSocket / HTTP）の DTO とドメインモデルとの変換
//! - `broadcast`: BroadcastHub の具体的な実装

pub mod broadcast;
pub mod dto;
