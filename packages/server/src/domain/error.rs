//! ドメイン層のエラー型

use thiserror::Error;

use super::value_object::ConnectionId;

/// 値オブジェクト生成時の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// 表示名の長さが範囲外（trim 後 1〜20 文字）
    #[error("user name must be 1-20 characters (got {length})")]
    InvalidUserName { length: usize },

    /// 本文の長さが範囲外（trim 後 1〜500 文字）
    #[error("message text must be 1-500 characters (got {length})")]
    InvalidMessageText { length: usize },

    /// 空の識別子
    #[error("identifier must not be empty")]
    EmptyId,
}

/// 在室者レジストリのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    /// 同じ接続が既に登録済み
    #[error("connection '{0}' is already registered")]
    AlreadyRegistered(ConnectionId),
}

/// BroadcastHub の送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    /// 宛先の接続が存在しない
    #[error("connection '{0}' not found")]
    ClientNotFound(String),

    /// 送信チャンネルへの書き込みに失敗
    #[error("failed to push event: {0}")]
    PushFailed(String),

    /// イベントのエンコードに失敗
    #[error("failed to encode event: {0}")]
    Encode(String),
}
