//! Push-channel client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Push-channel (WebSocket) client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Base WebSocket endpoint. The credential is appended as `?token=`.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Reconnect attempts allowed after an abnormal close before giving up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Fixed delay between reconnect attempts in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Largest inbound frame accepted, in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Timeout for the WebSocket handshake in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl RealtimeConfig {
    /// Delay between reconnect attempts.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Handshake timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay(),
            max_frame_bytes: default_max_frame_bytes(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_ws_url() -> String {
    "ws://localhost:5000/ws".to_string()
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay() -> u64 {
    3000
}

fn default_max_frame_bytes() -> usize {
    1024 * 1024
}

fn default_connect_timeout() -> u64 {
    10
}
