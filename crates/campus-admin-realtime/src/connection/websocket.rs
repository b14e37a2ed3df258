//! Production transport over `tokio-tungstenite`.

use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};
use url::Url;

use campus_admin_core::config::realtime::RealtimeConfig;
use campus_admin_core::error::AppError;

use super::transport::{Connector, Transport, TransportEvent};

/// Opens WebSocket transports with a handshake timeout.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    connect_timeout: Duration,
}

impl WebSocketConnector {
    /// Create a connector with the given handshake timeout.
    ///
    /// Installs the process-wide rustls crypto provider used for `wss://`
    /// handshakes unless one is already installed.
    pub fn new(connect_timeout: Duration) -> Self {
        install_crypto_provider();
        Self { connect_timeout }
    }

    /// Create a connector from configuration.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::new(config.connect_timeout())
    }
}

fn install_crypto_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if rustls::crypto::aws_lc_rs::default_provider().install_default().is_err() {
            trace!("rustls crypto provider already installed");
        }
    });
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn open(&self, url: &Url) -> Result<Box<dyn Transport>, AppError> {
        // The query string carries the credential; keep it out of logs.
        let host = url.host_str().unwrap_or_default().to_string();

        let (stream, response) = tokio::time::timeout(self.connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| {
                AppError::transport(format!(
                    "Handshake with {host} timed out after {}s",
                    self.connect_timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::transport(format!("Handshake with {host} failed: {e}")))?;

        debug!(host = %host, status = %response.status(), "WebSocket handshake complete");
        Ok(Box::new(WebSocketTransport::new(stream)))
    }
}

/// Where the read side is after an error or close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Open,
    Failed,
    Finished,
}

struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    read_state: ReadState,
}

impl WebSocketTransport {
    fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self {
            stream,
            read_state: ReadState::Open,
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn recv(&mut self) -> Option<TransportEvent> {
        match self.read_state {
            ReadState::Finished => return None,
            ReadState::Failed => {
                self.read_state = ReadState::Finished;
                return Some(TransportEvent::Closed(None));
            }
            ReadState::Open => {}
        }

        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Some(TransportEvent::Text(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    return Some(match std::str::from_utf8(&bytes) {
                        Ok(text) => TransportEvent::Text(text.to_owned()),
                        Err(e) => TransportEvent::Malformed(format!("binary frame is not UTF-8: {e}")),
                    });
                }
                Some(Ok(Message::Close(frame))) => {
                    self.read_state = ReadState::Finished;
                    return Some(TransportEvent::Closed(
                        frame.map(|f| (u16::from(f.code), f.reason.as_str().to_owned())),
                    ));
                }
                // Pings are answered by tungstenite on the next read or write.
                Some(Ok(other)) => {
                    trace!(kind = ?other, "Control frame");
                }
                Some(Err(e)) => {
                    self.read_state = ReadState::Failed;
                    return Some(TransportEvent::Error(e.to_string()));
                }
                None => {
                    self.read_state = ReadState::Finished;
                    return Some(TransportEvent::Closed(None));
                }
            }
        }
    }

    async fn send(&mut self, text: String) -> Result<(), AppError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| AppError::transport(format!("WebSocket write failed: {e}")))
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "WebSocket close failed");
        }
        self.read_state = ReadState::Finished;
    }
}
