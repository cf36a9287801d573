//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object tagged by its `type` field.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Frames sent from a client to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Join {
        #[serde(default, deserialize_with = "null_as_default")]
        user_name: String,
    },
    Message {
        #[serde(default, deserialize_with = "null_as_default")]
        text: String,
    },
    Typing {
        #[serde(default, deserialize_with = "null_as_default")]
        is_typing: bool,
    },
}

/// Frames sent from the server to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "history")]
    History(HistoryPayload),
    #[serde(rename = "userlist")]
    UserList(UserListPayload),
    #[serde(rename = "joined")]
    Joined(UserInfo),
    #[serde(rename = "left")]
    Left(UserInfo),
    #[serde(rename = "message")]
    Message(MessageInfo),
    #[serde(rename = "typing")]
    Typing(TypingInfo),
    #[serde(rename = "errorMsg")]
    ErrorMsg(ErrorInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPayload {
    pub messages: Vec<MessageInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListPayload {
    pub users: Vec<UserInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageInfo {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    /// HTML-escaped text
    pub text: String,
    /// Unix timestamp (milliseconds)
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingInfo {
    pub user_id: String,
    pub user_name: String,
    pub is_typing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_frames() {
        // テスト項目: クライアントからの各フレームが解析できる
        // given (前提条件):
        let join = r#"{"type":"join","userName":"Alice"}"#;
        let message = r#"{"type":"message","text":"hi"}"#;
        let typing = r#"{"type":"typing","isTyping":true}"#;

        // when (操作):
        let join: ClientMessage = serde_json::from_str(join).unwrap();
        let message: ClientMessage = serde_json::from_str(message).unwrap();
        let typing: ClientMessage = serde_json::from_str(typing).unwrap();

        // then (期待する結果):
        assert_eq!(
            join,
            ClientMessage::Join {
                user_name: "Alice".to_string()
            }
        );
        assert_eq!(
            message,
            ClientMessage::Message {
                text: "hi".to_string()
            }
        );
        assert_eq!(typing, ClientMessage::Typing { is_typing: true });
    }

    #[test]
    fn test_missing_payload_fields_default() {
        // テスト項目: ペイロードのフィールドが欠けている場合は既定値になる
        // given (前提条件):
        let join = r#"{"type":"join"}"#;
        let typing = r#"{"type":"typing"}"#;

        // when (操作):
        let join: ClientMessage = serde_json::from_str(join).unwrap();
        let typing: ClientMessage = serde_json::from_str(typing).unwrap();

        // then (期待する結果):
        assert_eq!(
            join,
            ClientMessage::Join {
                user_name: String::new()
            }
        );
        assert_eq!(typing, ClientMessage::Typing { is_typing: false });
    }

    #[test]
    fn test_null_payload_fields_default() {
        // テスト項目: ペイロードのフィールドが null の場合も既定値になる
        // given (前提条件):
        let join = r#"{"type":"join","userName":null}"#;
        let message = r#"{"type":"message","text":null}"#;
        let typing = r#"{"type":"typing","isTyping":null}"#;

        // when (操作):
        let join: ClientMessage = serde_json::from_str(join).unwrap();
        let message: ClientMessage = serde_json::from_str(message).unwrap();
        let typing: ClientMessage = serde_json::from_str(typing).unwrap();

        // then (期待する結果):
        assert_eq!(
            join,
            ClientMessage::Join {
                user_name: String::new()
            }
        );
        assert_eq!(
            message,
            ClientMessage::Message {
                text: String::new()
            }
        );
        assert_eq!(typing, ClientMessage::Typing { is_typing: false });
    }

    #[test]
    fn test_unknown_frame_type_is_rejected() {
        // テスト項目: 未知の type は解析エラーになる
        // given (前提条件):
        let frame = r#"{"type":"kick","userId":"x"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientMessage>(frame);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_server_frames_are_flat_and_tagged() {
        // テスト項目: サーバーからのフレームは type タグ付きのフラットな JSON になる
        // given (前提条件):
        let message = ServerMessage::Message(MessageInfo {
            id: "m1".to_string(),
            user_id: "u1".to_string(),
            user_name: "Alice".to_string(),
            text: "hi".to_string(),
            timestamp: 1000,
        });
        let error = ServerMessage::ErrorMsg(ErrorInfo {
            code: "INVALID_NAME".to_string(),
            message: "bad".to_string(),
        });

        // when (操作):
        let message = serde_json::to_value(&message).unwrap();
        let error = serde_json::to_value(&error).unwrap();

        // then (期待する結果):
        assert_eq!(
            message,
            serde_json::json!({
                "type": "message",
                "id": "m1",
                "userId": "u1",
                "userName": "Alice",
                "text": "hi",
                "timestamp": 1000
            })
        );
        assert_eq!(
            error,
            serde_json::json!({"type": "errorMsg", "code": "INVALID_NAME", "message": "bad"})
        );
    }
}
