//! ルームから接続へ送出されるイベント
//!
//! ワイヤ形式への変換は Infrastructure 層（`infrastructure::dto`）が担います。

use super::entity::{ChatMessage, RosterEntry};

/// 送信元接続のみに返すエラーのコード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidName,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidName => "INVALID_NAME",
        }
    }
}

/// Outbound events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// 履歴の再送（入室した接続のみ）
    History { messages: Vec<ChatMessage> },
    /// 在室者リスト
    UserList { users: Vec<RosterEntry> },
    /// 入室通知
    Joined(RosterEntry),
    /// 退室通知
    Left(RosterEntry),
    /// チャットメッセージ
    Message(ChatMessage),
    /// 入力中通知（送信者以外）
    Typing { user: RosterEntry, is_typing: bool },
    /// エラー通知（送信元のみ）
    Error { code: ErrorCode, message: String },
}

impl RoomEvent {
    /// Event name as it appears on the wire, used for logging
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::History { .. } => "history",
            RoomEvent::UserList { .. } => "userlist",
            RoomEvent::Joined(_) => "joined",
            RoomEvent::Left(_) => "left",
            RoomEvent::Message(_) => "message",
            RoomEvent::Typing { .. } => "typing",
            RoomEvent::Error { .. } => "errorMsg",
        }
    }
}
