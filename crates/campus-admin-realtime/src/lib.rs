//! # campus-admin-realtime
//!
//! Real-time notification layer of the campus marketplace admin dashboard:
//!
//! - A single supervised push-channel connection, authenticated with the
//!   admin credential, with bounded fixed-delay reconnection
//! - A typed publish/subscribe registry fanning server events out to any
//!   number of independently registered listeners
//! - Session binding that follows the signed-in credential
//! - Client-side metrics

pub mod connection;
pub mod dispatcher;
pub mod message;
pub mod metrics;
pub mod service;
pub mod session;

pub use connection::manager::ConnectionManager;
pub use connection::state::ConnectionState;
pub use connection::websocket::WebSocketConnector;
pub use dispatcher::listener::Listener;
pub use dispatcher::registry::EventDispatcher;
pub use dispatcher::subscription::Subscription;
pub use message::types::ServerEvent;
pub use metrics::RealtimeMetrics;
pub use service::RealtimeService;
pub use session::SessionBinding;
