//! Seam between the connection manager and the wire.

use async_trait::async_trait;
use url::Url;

use campus_admin_core::error::AppError;

/// What an open transport reports back to the connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// An inbound text frame.
    Text(String),
    /// An inbound frame that could not be read as text.
    Malformed(String),
    /// A transport-level error. A `Closed` follows.
    Error(String),
    /// The channel closed, with the close code and reason when the peer sent one.
    Closed(Option<(u16, String)>),
}

/// Opens transports. One connector is shared by every connection attempt.
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    /// Perform the handshake against `url`.
    async fn open(&self, url: &Url) -> Result<Box<dyn Transport>, AppError>;
}

/// An open, bidirectional text channel.
#[async_trait]
pub trait Transport: Send {
    /// Next inbound event. `None` once the channel is finished.
    async fn recv(&mut self) -> Option<TransportEvent>;

    /// Write one text frame.
    async fn send(&mut self, text: String) -> Result<(), AppError>;

    /// Close the channel. Errors while closing are ignored.
    async fn close(&mut self);
}
