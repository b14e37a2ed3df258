//! Push-channel connection management: lifecycle, reconnect policy, transport.

#[cfg(test)]
pub(crate) mod fake;
pub mod handle;
pub mod manager;
pub mod reconnect;
pub mod state;
pub mod transport;
pub mod websocket;

pub use manager::ConnectionManager;
pub use state::ConnectionState;
pub use transport::{Connector, Transport, TransportEvent};
pub use websocket::WebSocketConnector;
