//! Top-level realtime service that ties the connection and the dispatcher together.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use campus_admin_core::Credential;
use campus_admin_core::config::realtime::RealtimeConfig;

use crate::connection::manager::ConnectionManager;
use crate::connection::state::ConnectionState;
use crate::connection::transport::Connector;
use crate::connection::websocket::WebSocketConnector;
use crate::dispatcher::listener::Listener;
use crate::dispatcher::registry::EventDispatcher;
use crate::dispatcher::subscription::Subscription;
use crate::message::types::ServerEvent;
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};

/// The push-channel client as the rest of the dashboard sees it.
///
/// Cheap to clone; every clone drives the same connection and registry.
#[derive(Clone)]
pub struct RealtimeService {
    /// Connection manager.
    pub connection: ConnectionManager,
    /// Listener registry.
    pub dispatcher: Arc<EventDispatcher>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
}

impl std::fmt::Debug for RealtimeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeService")
            .field("state", &self.connection.state())
            .finish()
    }
}

impl RealtimeService {
    /// Creates the service with the WebSocket transport.
    pub fn new(config: &RealtimeConfig) -> Self {
        Self::with_connector(config, Arc::new(WebSocketConnector::from_config(config)))
    }

    /// Creates the service over any transport.
    pub fn with_connector(config: &RealtimeConfig, connector: Arc<dyn Connector>) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let dispatcher = Arc::new(EventDispatcher::new(metrics.clone()));
        let connection =
            ConnectionManager::new(config, connector, dispatcher.clone(), metrics.clone());

        info!(
            max_reconnect_attempts = config.max_reconnect_attempts,
            reconnect_delay_ms = config.reconnect_delay_ms,
            "Realtime service initialized"
        );

        Self {
            connection,
            dispatcher,
            metrics,
        }
    }

    /// See [`ConnectionManager::connect`].
    pub fn connect(&self, credential: Credential) {
        self.connection.connect(credential);
    }

    /// See [`ConnectionManager::disconnect`].
    pub fn disconnect(&self) {
        self.connection.disconnect();
    }

    /// See [`ConnectionManager::send`].
    pub fn send<T: Serialize + ?Sized>(&self, event: &str, payload: &T) {
        self.connection.send(event, payload);
    }

    /// Whether the channel is open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// See [`EventDispatcher::subscribe`].
    pub fn subscribe(&self, event: impl Into<String>, listener: Listener) {
        self.dispatcher.subscribe(event, listener);
    }

    /// See [`EventDispatcher::unsubscribe`].
    pub fn unsubscribe(&self, event: &str, listener: &Listener) -> bool {
        self.dispatcher.unsubscribe(event, listener)
    }

    /// See [`EventDispatcher::listen`].
    pub fn listen(&self, event: impl Into<String>, listener: Listener) -> Subscription {
        self.dispatcher.listen(event, listener)
    }

    /// See [`EventDispatcher::listen_event`].
    pub fn listen_event<F>(&self, event: impl Into<String>, f: F) -> Subscription
    where
        F: Fn(ServerEvent) + Send + Sync + 'static,
    {
        self.dispatcher.listen_event(event, f)
    }

    /// Snapshot of the client counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Closes the channel after flushing queued frames. Registrations stay
    /// in place.
    pub async fn shutdown(&self) {
        info!("Shutting down realtime service");
        self.connection.close().await;
        info!("Realtime service shut down");
    }
}
