//! サーバー起動設定
//!
//! コマンドライン引数と環境変数の両方から読み込みます（引数が優先）。

use clap::Parser;

use crate::domain::{
    history::DEFAULT_HISTORY_SIZE,
    rate_limiter::{DEFAULT_BURST, DEFAULT_RATE_PER_SECOND},
    room::DEFAULT_ROOM_NAME,
    RateLimitConfig, RoomConfig,
};

/// Single-room WebSocket chat relay
#[derive(Parser, Debug, Clone)]
#[command(name = "hiroba-server")]
#[command(about = "Single-room WebSocket chat relay", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to listen on
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Display name of the room
    #[arg(long, env = "ROOM_NAME", default_value = DEFAULT_ROOM_NAME)]
    pub room_name: String,

    /// Number of messages kept for replay to new participants
    #[arg(long, env = "HISTORY_SIZE", default_value_t = DEFAULT_HISTORY_SIZE)]
    pub history_size: usize,

    /// Sustained chat messages per second allowed per connection
    #[arg(
        long,
        env = "RATE_LIMIT_MSG_PER_SEC",
        default_value_t = DEFAULT_RATE_PER_SECOND,
        allow_negative_numbers = true
    )]
    pub rate_limit_per_second: f64,

    /// Maximum burst of chat messages per connection
    #[arg(
        long,
        env = "RATE_LIMIT_BURST",
        default_value_t = DEFAULT_BURST,
        allow_negative_numbers = true
    )]
    pub rate_limit_burst: f64,
}

impl ServerConfig {
    /// ドメイン層のルーム設定へ変換（レート制限値はここで正規化される）
    pub fn room_config(&self) -> RoomConfig {
        RoomConfig {
            room_name: self.room_name.clone(),
            history_size: self.history_size,
            rate_limit: RateLimitConfig::new(self.rate_limit_per_second, self.rate_limit_burst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatRoom, Timestamp};

    #[test]
    fn test_explicit_arguments_are_parsed() {
        // テスト項目: 全ての設定値を引数で指定できる
        // given (前提条件):
        let args = [
            "hiroba-server",
            "--host",
            "0.0.0.0",
            "--port",
            "4000",
            "--room-name",
            "Lobby",
            "--history-size",
            "20",
            "--rate-limit-per-second",
            "2.5",
            "--rate-limit-burst",
            "4",
        ];

        // when (操作):
        let config = ServerConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 4000);
        let room = config.room_config();
        assert_eq!(room.room_name, "Lobby");
        assert_eq!(room.history_size, 20);
        assert_eq!(room.rate_limit.rate_per_second(), 2.5);
        assert_eq!(room.rate_limit.burst(), 4.0);
    }

    #[test]
    fn test_out_of_range_rate_limits_are_coerced() {
        // テスト項目: 負のレートと 1 未満のバーストは最小値に丸められる
        // given (前提条件):
        let args = [
            "hiroba-server",
            "--rate-limit-per-second",
            "-3",
            "--rate-limit-burst",
            "0",
        ];

        // when (操作):
        let config = ServerConfig::try_parse_from(args).unwrap();
        let room = config.room_config();

        // then (期待する結果):
        assert_eq!(room.rate_limit.rate_per_second(), 0.0);
        assert_eq!(room.rate_limit.burst(), 1.0);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        // テスト項目: 範囲外のポート番号はエラーになる
        // given (前提条件):
        let args = ["hiroba-server", "--port", "70000"];

        // when (操作):
        let result = ServerConfig::try_parse_from(args);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_huge_history_size_builds_room() {
        // テスト項目: 非常に大きな履歴件数を指定してもルームを生成できる
        // given (前提条件):
        let args = ["hiroba-server", "--history-size", "9223372036854775807"];
        let config = ServerConfig::try_parse_from(args).unwrap();

        // when (操作):
        let room = ChatRoom::new(config.room_config().history_size, Timestamp::new(0));

        // then (期待する結果):
        assert_eq!(room.history().capacity(), 9_223_372_036_854_775_807);
        assert!(room.history().is_empty());
    }
}
