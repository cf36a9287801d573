//! Message formatting utilities for client display.

use hiroba_server::infrastructure::dto::websocket::{ErrorInfo, MessageInfo, UserInfo};
use hiroba_shared::time::timestamp_to_local_time;

const RULE: &str = "============================================================";

/// Reverse the server's HTML escaping for terminal display.
///
/// Entities are decoded in a single pass, so `&amp;lt;` comes back as the
/// literal text `&lt;`.
pub fn unescape_html(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the history replayed right after joining
    pub fn format_history(messages: &[MessageInfo], own_user_ids: &[String]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str("Recent messages:\n");

        if messages.is_empty() {
            output.push_str("(No messages yet)\n");
        } else {
            for message in messages {
                let is_mine = own_user_ids.contains(&message.user_id);
                output.push_str(&Self::format_message_line(message, is_mine));
                output.push('\n');
            }
        }

        output.push_str(RULE);
        output.push('\n');
        output
    }

    /// Format the roster, marking the users that belong to this client
    pub fn format_user_list(users: &[UserInfo], own_user_ids: &[String]) -> String {
        let names: Vec<String> = users
            .iter()
            .map(|user| {
                let name = unescape_html(&user.user_name);
                if own_user_ids.contains(&user.user_id) {
                    format!("{} (me)", name)
                } else {
                    name
                }
            })
            .collect();

        if names.is_empty() {
            "\nOnline: (nobody)\n".to_string()
        } else {
            format!("\nOnline ({}): {}\n", names.len(), names.join(", "))
        }
    }

    pub fn format_joined(user: &UserInfo, is_me: bool) -> String {
        if is_me {
            format!("\n* You joined as {}\n", unescape_html(&user.user_name))
        } else {
            format!("\n+ {} joined\n", unescape_html(&user.user_name))
        }
    }

    pub fn format_left(user: &UserInfo) -> String {
        format!("\n- {} left\n", unescape_html(&user.user_name))
    }

    /// Format a live chat message
    pub fn format_chat_message(message: &MessageInfo, is_mine: bool) -> String {
        format!("\n{}\n", Self::format_message_line(message, is_mine))
    }

    /// Format a typing indicator
    ///
    /// Only the start of typing is shown; a stop signal produces nothing.
    pub fn format_typing(user_name: &str, is_typing: bool) -> Option<String> {
        is_typing.then(|| format!("\n... {} is typing\n", unescape_html(user_name)))
    }

    pub fn format_error(error: &ErrorInfo) -> String {
        format!("\n! [{}] {}\n", error.code, error.message)
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }

    fn format_message_line(message: &MessageInfo, is_mine: bool) -> String {
        let marker = if is_mine { " (me)" } else { "" };
        format!(
            "[{}] @{}{}: {}",
            timestamp_to_local_time(message.timestamp),
            unescape_html(&message.user_name),
            marker,
            unescape_html(&message.text)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(user_id: &str, user_name: &str, text: &str) -> MessageInfo {
        MessageInfo {
            id: "m-1".to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            text: text.to_string(),
            timestamp: 1672498800000,
        }
    }

    fn user(user_id: &str, user_name: &str) -> UserInfo {
        UserInfo {
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
        }
    }

    #[test]
    fn test_unescape_html_restores_characters() {
        // テスト項目: エスケープされた文字が元に戻る
        // given (前提条件):
        let escaped = "&lt;b&gt;Tom &amp; Jerry&#x27;s &quot;show&quot;&lt;/b&gt;";

        // when (操作):
        let result = unescape_html(escaped);

        // then (期待する結果):
        assert_eq!(result, "<b>Tom & Jerry's \"show\"</b>");
    }

    #[test]
    fn test_unescape_html_decodes_only_once() {
        // テスト項目: 二重にエスケープされた文字列は 1 段だけ戻る
        // given (前提条件):
        let escaped = "&amp;lt;";

        // when (操作):
        let result = unescape_html(escaped);

        // then (期待する結果):
        assert_eq!(result, "&lt;");
    }

    #[test]
    fn test_format_history_with_no_messages() {
        // テスト項目: 履歴が空の場合、適切なメッセージが表示される
        // given (前提条件):
        let messages = vec![];

        // when (操作):
        let result = MessageFormatter::format_history(&messages, &[]);

        // then (期待する結果):
        assert!(result.contains("Recent messages:"));
        assert!(result.contains("(No messages yet)"));
        assert!(result.contains(RULE));
    }

    #[test]
    fn test_format_history_marks_own_messages() {
        // テスト項目: 履歴のうち自分の発言にだけマークが付く
        // given (前提条件):
        let messages = vec![message("u-1", "alice", "hello"), message("u-2", "bob", "hi")];
        let own = vec!["u-1".to_string()];

        // when (操作):
        let result = MessageFormatter::format_history(&messages, &own);

        // then (期待する結果):
        assert!(result.contains("@alice (me): hello"));
        assert!(result.contains("@bob: hi"));
        assert!(result.contains(&timestamp_to_local_time(1672498800000)));
    }

    #[test]
    fn test_format_user_list() {
        // テスト項目: 在室者が人数付きで表示され、自分にはマークが付く
        // given (前提条件):
        let users = vec![user("u-1", "alice"), user("u-2", "bob")];
        let own = vec!["u-2".to_string()];

        // when (操作):
        let result = MessageFormatter::format_user_list(&users, &own);

        // then (期待する結果):
        assert!(result.contains("Online (2): alice, bob (me)"));
    }

    #[test]
    fn test_format_joined_and_left() {
        // テスト項目: 入室・退室通知が正しくフォーマットされる
        // given (前提条件):
        let bob = user("u-2", "bob");

        // when (操作):
        let joined = MessageFormatter::format_joined(&bob, false);
        let joined_me = MessageFormatter::format_joined(&bob, true);
        let left = MessageFormatter::format_left(&bob);

        // then (期待する結果):
        assert!(joined.contains("+ bob joined"));
        assert!(joined_me.contains("You joined as bob"));
        assert!(left.contains("- bob left"));
    }

    #[test]
    fn test_format_chat_message_unescapes_text() {
        // テスト項目: チャットメッセージの本文がエスケープ解除されて表示される
        // given (前提条件):
        let msg = message("u-1", "alice", "1 &lt; 2");

        // when (操作):
        let result = MessageFormatter::format_chat_message(&msg, false);

        // then (期待する結果):
        assert!(result.contains("@alice: 1 < 2"));
    }

    #[test]
    fn test_format_typing_only_when_started() {
        // テスト項目: 入力開始だけが表示され、入力終了は何も表示しない
        // given (前提条件):
        let name = "bob";

        // when (操作):
        let started = MessageFormatter::format_typing(name, true);
        let stopped = MessageFormatter::format_typing(name, false);

        // then (期待する結果):
        assert_eq!(started.as_deref(), Some("\n... bob is typing\n"));
        assert!(stopped.is_none());
    }

    #[test]
    fn test_format_error() {
        // テスト項目: エラー通知にコードと本文が含まれる
        // given (前提条件):
        let error = ErrorInfo {
            code: "INVALID_NAME".to_string(),
            message: "Name must be 1-20 characters.".to_string(),
        };

        // when (操作):
        let result = MessageFormatter::format_error(&error);

        // then (期待する結果):
        assert!(result.contains("[INVALID_NAME] Name must be 1-20 characters."));
    }

    #[test]
    fn test_format_binary_and_raw_message() {
        // テスト項目: バイナリ・解釈できないテキストの通知が正しくフォーマットされる
        // given (前提条件):
        let byte_count = 1024;
        let text = "unknown message format";

        // when (操作):
        let binary = MessageFormatter::format_binary_message(byte_count);
        let raw = MessageFormatter::format_raw_message(text);

        // then (期待する結果):
        assert!(binary.contains("1024 bytes"));
        assert!(raw.contains("Received: unknown message format"));
    }
}
