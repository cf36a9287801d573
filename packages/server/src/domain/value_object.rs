//! 値オブジェクト
//!
//! 生成時に不変条件を検証し、以降は不変として扱います。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{error::ValueObjectError, sanitizer::escape_html};

/// 表示名の最大文字数
pub const USER_NAME_MAX_CHARS: usize = 20;

/// 本文の最大文字数（エスケープ前）
pub const MESSAGE_TEXT_MAX_CHARS: usize = 500;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// 暗号論的乱数に基づく 128bit の ID を新規発行
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// 既存の文字列から生成（空文字列は不可）
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                if value.is_empty() {
                    return Err(ValueObjectError::EmptyId);
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// トランスポート上の接続を識別する ID
    ConnectionId
);

opaque_id!(
    /// 参加者 ID（プロセスの生存期間中一意）
    UserId
);

opaque_id!(
    /// メッセージ ID
    MessageId
);

/// 表示名
///
/// 前後の空白を除去した上で 1〜20 文字であることを保証します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// 生の入力から表示名を生成
    pub fn parse(raw: &str) -> Result<Self, ValueObjectError> {
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if !(1..=USER_NAME_MAX_CHARS).contains(&length) {
            return Err(ValueObjectError::InvalidUserName { length });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// サニタイズ済みの本文
///
/// trim 後の長さを検証してからエスケープします。保持している文字列は常に
/// エスケープ済みです。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    /// 生の入力から本文を生成
    pub fn parse(raw: &str) -> Result<Self, ValueObjectError> {
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if !(1..=MESSAGE_TEXT_MAX_CHARS).contains(&length) {
            return Err(ValueObjectError::InvalidMessageText { length });
        }
        Ok(Self(escape_html(trimmed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
