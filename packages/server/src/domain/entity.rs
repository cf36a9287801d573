//! エンティティ

use serde::Serialize;

use super::value_object::{MessageId, MessageText, Timestamp, UserId, UserName};

/// 入室した参加者の識別情報
///
/// join 成功時に生成され、切断まで変更されません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub user_name: UserName,
    pub joined_at: Timestamp,
}

impl Identity {
    /// 新しい ID を発行して Identity を生成
    pub fn mint(user_name: UserName, joined_at: Timestamp) -> Self {
        Self {
            user_id: UserId::generate(),
            user_name,
            joined_at,
        }
    }

    pub fn roster_entry(&self) -> RosterEntry {
        RosterEntry {
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
        }
    }
}

/// 在室者リストの 1 エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub user_id: UserId,
    pub user_name: UserName,
}

/// 受理されたチャットメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub user_id: UserId,
    pub user_name: UserName,
    pub text: MessageText,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    /// 送信者の Identity から新しいメッセージを生成
    pub fn new(author: &Identity, text: MessageText, timestamp: Timestamp) -> Self {
        Self {
            id: MessageId::generate(),
            user_id: author.user_id.clone(),
            user_name: author.user_name.clone(),
            text,
            timestamp,
        }
    }
}
