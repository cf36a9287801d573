//! ドメイン層
//!
//! チャットルームのビジネスルール（名前・本文の検証、レート制限、在室者管理、
//! 履歴保持）を外部の I/O から切り離して定義します。

pub mod broadcast;
pub mod entity;
pub mod error;
pub mod event;
pub mod history;
pub mod presence;
pub mod rate_limiter;
pub mod room;
pub mod sanitizer;
pub mod value_object;

pub use broadcast::{BroadcastHub, OUTBOUND_QUEUE_CAPACITY, OutboundChannel};
#[cfg(test)]
pub use broadcast::MockBroadcastHub;
pub use entity::{ChatMessage, Identity, RosterEntry};
pub use error::{BroadcastError, PresenceError, ValueObjectError};
pub use event::{ErrorCode, RoomEvent};
pub use history::HistoryLog;
pub use presence::PresenceRegistry;
pub use rate_limiter::{RateLimitConfig, TokenBucket};
pub use room::{ChatRoom, RoomConfig};
pub use sanitizer::escape_html;
pub use value_object::{ConnectionId, MessageId, MessageText, Timestamp, UserId, UserName};
