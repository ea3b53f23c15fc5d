//! Server configuration.
//!
//! The binary fills this from command-line flags and `PARLOR_*` environment
//! variables; tests construct it directly.

use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_ROOM_TTL_SECS: u64 = 600;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long a new socket may stay unauthenticated
    pub auth_timeout: Duration,
    /// Period of the inactivity sweep
    pub sweep_interval: Duration,
    /// Inactivity after which a room is archived
    pub room_ttl: Duration,
    /// Messages sent to a joiner as `roomHistory`
    pub history_limit: usize,
    /// Joining a room leaves every other room first
    pub exclusive_rooms: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            auth_timeout: Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            room_ttl: Duration::from_secs(DEFAULT_ROOM_TTL_SECS),
            history_limit: DEFAULT_HISTORY_LIMIT,
            exclusive_rooms: false,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// TTL in milliseconds, saturating for absurdly large values
    pub fn room_ttl_millis(&self) -> i64 {
        i64::try_from(self.room_ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // テスト項目: 既定値が 127.0.0.1:8080、認証 5 秒、スイープ 10 秒、TTL 600 秒になる
        // given (前提条件):
        let config = ServerConfig::default();

        // when (操作) / then (期待する結果):
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.auth_timeout, Duration::from_secs(5));
        assert_eq!(config.sweep_interval, Duration::from_secs(10));
        assert_eq!(config.room_ttl_millis(), 600_000);
        assert_eq!(config.history_limit, 100);
        assert!(!config.exclusive_rooms);
    }
}
