//! メッセージ履歴
//!
//! 到着順に最新 `capacity` 件までを保持し、超過分は先頭（最古）から破棄します。

use std::collections::VecDeque;

use super::entity::ChatMessage;

/// Default number of retained messages
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Bounded, ordered message log (oldest first)
#[derive(Debug, Clone)]
pub struct HistoryLog {
    capacity: usize,
    messages: VecDeque<ChatMessage>,
}

impl HistoryLog {
    /// 容量を指定して生成（0 の場合は常に空）
    ///
    /// 領域は追加に応じて確保するため、大きな容量を指定しても生成時には確保しません。
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            messages: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_SIZE)),
        }
    }

    /// 末尾に追加し、容量を超えた分を先頭から破棄
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    /// 古い順の独立したコピーを返す
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entity::Identity,
        value_object::{MessageText, Timestamp, UserName},
    };

    fn message(author: &Identity, text: &str, timestamp: i64) -> ChatMessage {
        ChatMessage::new(
            author,
            MessageText::parse(text).unwrap(),
            Timestamp::new(timestamp),
        )
    }

    fn alice() -> Identity {
        Identity::mint(UserName::parse("Alice").unwrap(), Timestamp::new(0))
    }

    #[test]
    fn test_append_preserves_arrival_order() {
        // テスト項目: 追加順が保持される
        // given (前提条件):
        let mut log = HistoryLog::new(10);
        let author = alice();

        // when (操作):
        for i in 0..5 {
            log.append(message(&author, &format!("msg-{}", i), i));
        }

        // then (期待する結果):
        let texts: Vec<String> = log
            .snapshot()
            .iter()
            .map(|m| m.text.as_str().to_string())
            .collect();
        assert_eq!(texts, vec!["msg-0", "msg-1", "msg-2", "msg-3", "msg-4"]);
    }

    #[test]
    fn test_append_beyond_capacity_evicts_oldest() {
        // テスト項目: 容量超過時は最古のメッセージから破棄され、最新 capacity 件が残る
        // given (前提条件):
        let mut log = HistoryLog::new(3);
        let author = alice();

        // when (操作):
        for i in 0..7 {
            log.append(message(&author, &format!("msg-{}", i), i));
        }

        // then (期待する結果):
        assert_eq!(log.len(), 3);
        let texts: Vec<String> = log
            .snapshot()
            .iter()
            .map(|m| m.text.as_str().to_string())
            .collect();
        assert_eq!(texts, vec!["msg-4", "msg-5", "msg-6"]);
    }

    #[test]
    fn test_zero_capacity_is_always_empty() {
        // テスト項目: 容量 0 の履歴は常に空
        // given (前提条件):
        let mut log = HistoryLog::new(0);

        // when (操作):
        log.append(message(&alice(), "hello", 1));

        // then (期待する結果):
        assert!(log.is_empty());
        assert!(log.snapshot().is_empty());
    }

    #[test]
    fn test_snapshot_is_independent_of_later_appends() {
        // テスト項目: 取得済みのスナップショットは後続の追加・破棄の影響を受けない
        // given (前提条件):
        let mut log = HistoryLog::new(2);
        let author = alice();
        log.append(message(&author, "first", 1));
        log.append(message(&author, "second", 2));
        let delivered = log.snapshot();

        // when (操作):
        log.append(message(&author, "third", 3));

        // then (期待する結果):
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].text.as_str(), "first");
        assert_eq!(log.snapshot()[0].text.as_str(), "second");
    }

    #[test]
    fn test_huge_capacity_is_accepted() {
        // テスト項目: 非常に大きな容量でも生成でき、通常通り追加できる
        // given (前提条件):
        let mut log = HistoryLog::new(usize::MAX);

        // when (操作):
        log.append(message(&alice(), "hello", 1));

        // then (期待する結果):
        assert_eq!(log.capacity(), usize::MAX);
        assert_eq!(log.len(), 1);
    }
}
