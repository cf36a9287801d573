//! UseCase 層のエラー型
//!
//! いずれも接続を切断する理由にはなりません。UI 層はログ出力のみ行います。

use thiserror::Error;

use crate::domain::ValueObjectError;

/// セッション操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 名前・本文の長さが範囲外
    #[error("validation failed: {0}")]
    Validation(#[from] ValueObjectError),

    /// レート制限超過（送信元には通知しない）
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// 入室済みのセッションからの join（無視する）
    #[error("session has already joined")]
    DuplicateJoin,

    /// 未入室のセッションからの message / typing（無視する）
    #[error("action requires a joined session")]
    UnregisteredAction,

    /// 入力中通知の間引き
    #[error("typing signal throttled")]
    TypingThrottled,
}
