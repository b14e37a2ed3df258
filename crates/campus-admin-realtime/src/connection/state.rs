//! Observable lifecycle state of the push channel.

use std::fmt;

use serde::Serialize;

/// Where the connection manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    /// No channel and nothing scheduled.
    Disconnected,
    /// A handshake is in flight.
    Connecting,
    /// The channel is open and frames flow both ways.
    Open,
    /// The channel dropped and reconnect attempt `attempt` is scheduled.
    Reconnecting {
        /// 1-based attempt number.
        attempt: u32,
    },
}

impl ConnectionState {
    /// Whether the channel is open.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Reconnecting { attempt } => write!(f, "reconnecting (attempt {attempt})"),
        }
    }
}
