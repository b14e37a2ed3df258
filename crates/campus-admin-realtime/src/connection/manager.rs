//! Connection manager: owns the single push-channel link and its reconnect loop.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use campus_admin_core::Credential;
use campus_admin_core::config::realtime::RealtimeConfig;
use campus_admin_core::error::AppError;
use campus_admin_core::events::EventKind;

use crate::dispatcher::registry::EventDispatcher;
use crate::message::envelope;
use crate::metrics::RealtimeMetrics;

use super::handle::LinkHandle;
use super::reconnect::{ReconnectPolicy, ReconnectState};
use super::state::ConnectionState;
use super::transport::{Connector, TransportEvent};

/// Supervises at most one push-channel connection.
///
/// All public methods are synchronous and return immediately; the handshake,
/// the read loop, and the reconnect timer run as spawned Tokio tasks. Health
/// is reported through the `connected`, `disconnected`, `error` and
/// `reconnect-failed` events on the shared [`EventDispatcher`].
#[derive(Clone)]
pub struct ConnectionManager {
    shared: Arc<Shared>,
}

struct Shared {
    ws_url: String,
    max_frame_bytes: usize,
    policy: ReconnectPolicy,
    connector: Arc<dyn Connector>,
    dispatcher: Arc<EventDispatcher>,
    metrics: Arc<RealtimeMetrics>,
    state: Mutex<ManagerState>,
}

#[derive(Debug)]
struct ManagerState {
    phase: ConnectionState,
    link: Option<LinkHandle>,
    reconnect: ReconnectState,
    /// Bumped on every open and on disconnect; work tagged with an older
    /// value is stale.
    generation: u64,
    /// Reused by reconnect attempts.
    credential: Option<Credential>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .field("connector", &self.shared.connector)
            .finish()
    }
}

impl ConnectionManager {
    /// Creates a manager in the disconnected state.
    pub fn new(
        config: &RealtimeConfig,
        connector: Arc<dyn Connector>,
        dispatcher: Arc<EventDispatcher>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                ws_url: config.ws_url.clone(),
                max_frame_bytes: config.max_frame_bytes,
                policy: ReconnectPolicy::from_config(config),
                connector,
                dispatcher,
                metrics,
                state: Mutex::new(ManagerState {
                    phase: ConnectionState::Disconnected,
                    link: None,
                    reconnect: ReconnectState::default(),
                    generation: 0,
                    credential: None,
                }),
            }),
        }
    }

    /// Starts opening the channel with `credential`.
    ///
    /// A no-op while the channel is open or a handshake is in flight. While a
    /// reconnect is pending the timer is cancelled and the channel opens
    /// immediately with a fresh attempt budget. Failures are logged and
    /// reported through events, never returned.
    pub fn connect(&self, credential: Credential) {
        if tokio::runtime::Handle::try_current().is_err() {
            error!("connect() called outside a Tokio runtime; ignoring");
            return;
        }

        let mut guard = self.shared.lock();
        let state = &mut *guard;
        match state.phase {
            ConnectionState::Open | ConnectionState::Connecting => {
                debug!(state = %state.phase, "Push channel already active; connect ignored");
                return;
            }
            ConnectionState::Reconnecting { attempt } => {
                state.reconnect.cancel_pending();
                debug!(attempt, "Explicit connect replaces pending reconnect");
            }
            ConnectionState::Disconnected => {}
        }

        state.reconnect.reset();
        state.credential = Some(credential);
        self.shared.begin_open(state);
    }

    /// Closes the channel and cancels any pending reconnect.
    ///
    /// Emits `disconnected` only if the channel was open. Listener
    /// registrations are untouched.
    pub fn disconnect(&self) {
        let (was_open, _task) = self.detach();
        if was_open {
            self.shared.emit(EventKind::Disconnected, &Value::Null);
        }
    }

    /// Like [`disconnect`](Self::disconnect), then waits until queued frames
    /// are written and the channel is closed.
    pub async fn close(&self) {
        let (was_open, task) = self.detach();
        if was_open {
            self.shared.emit(EventKind::Disconnected, &Value::Null);
        }
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Connection task ended abnormally");
            }
        }
    }

    fn detach(&self) -> (bool, Option<JoinHandle<()>>) {
        let mut guard = self.shared.lock();
        let state = &mut *guard;

        let cancelled_timer = state.reconnect.cancel_pending();
        state.generation += 1;

        let link = state.link.take();
        let was_open = link.as_ref().is_some_and(LinkHandle::is_open);
        if let Some(link) = &link {
            debug!(generation = link.generation, was_open, "Stopping connection task");
        }
        let task = link.and_then(LinkHandle::shutdown);

        let previous = std::mem::replace(&mut state.phase, ConnectionState::Disconnected);
        if previous != ConnectionState::Disconnected {
            info!(previous = %previous, cancelled_timer, "Push channel disconnected by request");
        }
        (was_open, task)
    }

    /// Sends `{ "type": event, "payload": payload }` if the channel is open.
    ///
    /// Otherwise logs a warning and drops the frame. Never blocks and never
    /// reports delivery.
    pub fn send<T: Serialize + ?Sized>(&self, event: &str, payload: &T) {
        let text = match envelope::encode(event, payload) {
            Ok(text) => text,
            Err(e) => {
                self.shared.metrics.send_dropped();
                warn!(event = %event, error = %e, "Dropping outbound frame that failed to encode");
                return;
            }
        };

        let queued = {
            let state = self.shared.lock();
            state.phase.is_open() && state.link.as_ref().is_some_and(|link| link.send(text))
        };

        if queued {
            self.shared.metrics.frame_sent();
            trace!(event = %event, "Outbound frame queued");
        } else {
            self.shared.metrics.send_dropped();
            warn!(event = %event, "Push channel not open; dropping outbound frame");
        }
    }

    /// Whether the channel is open.
    pub fn is_connected(&self) -> bool {
        let state = self.shared.lock();
        state.phase.is_open() && state.link.as_ref().is_some_and(LinkHandle::is_open)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.shared.lock().phase
    }

    /// Reconnect attempts made since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.shared.lock().reconnect.attempts
    }

    /// The dispatcher events are emitted through.
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.shared.dispatcher
    }

    /// Client metrics.
    pub fn metrics(&self) -> &Arc<RealtimeMetrics> {
        &self.shared.metrics
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, kind: EventKind, payload: &Value) {
        self.dispatcher.emit(kind.as_str(), payload);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    fn connection_url(&self, credential: &Credential) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.ws_url)?;
        url.query_pairs_mut().append_pair("token", credential.as_str());
        Ok(url)
    }

    /// Spawns a connection task for the stored credential. Caller holds the lock.
    fn begin_open(self: &Arc<Self>, state: &mut ManagerState) {
        let Some(credential) = state.credential.as_ref() else {
            state.phase = ConnectionState::Disconnected;
            return;
        };

        let url = match self.connection_url(credential) {
            Ok(url) => url,
            Err(e) => {
                error!(error = %e, "Cannot build push-channel URL; staying disconnected");
                state.phase = ConnectionState::Disconnected;
                return;
            }
        };

        state.generation += 1;
        let generation = state.generation;
        let cancel = CancellationToken::new();
        let mut link = LinkHandle::connecting(generation, cancel.clone());
        state.phase = ConnectionState::Connecting;

        debug!(generation, host = url.host_str().unwrap_or_default(), "Opening push channel");
        link.task = Some(tokio::spawn(Arc::clone(self).run_connection(generation, url, cancel)));
        state.link = Some(link);
    }

    async fn run_connection(self: Arc<Self>, generation: u64, url: Url, cancel: CancellationToken) {
        let opened = tokio::select! {
            _ = cancel.cancelled() => return,
            result = self.connector.open(&url) => result,
        };

        let mut transport = match opened {
            Ok(transport) => transport,
            Err(e) => {
                error!(generation, error = %e, "Push channel failed to open");
                if self.is_current(generation) {
                    self.emit(EventKind::Error, &json!(e.message));
                }
                self.handle_close(generation, None);
                return;
            }
        };

        let (tx, mut outbound) = mpsc::unbounded_channel();
        if !self.mark_open(generation, tx) {
            transport.close().await;
            return;
        }
        self.announce_open(generation);

        let close = loop {
            // Queued frames go out before a requested close.
            tokio::select! {
                biased;
                Some(text) = outbound.recv() => {
                    if let Err(e) = transport.send(text).await {
                        warn!(generation, error = %e, "Failed to write outbound frame");
                    }
                }
                _ = cancel.cancelled() => {
                    transport.close().await;
                    debug!(generation, "Connection task stopped");
                    return;
                }
                event = transport.recv() => match event {
                    Some(TransportEvent::Text(text)) => self.handle_frame(&text),
                    Some(TransportEvent::Malformed(reason)) => {
                        self.metrics.frame_received();
                        self.metrics.frame_malformed();
                        warn!(generation, reason = %reason, "Dropping malformed frame");
                    }
                    Some(TransportEvent::Error(detail)) => {
                        warn!(generation, error = %detail, "Push channel transport error");
                        self.emit(EventKind::Error, &json!(detail));
                    }
                    Some(TransportEvent::Closed(frame)) => break frame,
                    None => break None,
                }
            }
        };

        match &close {
            Some((code, reason)) => info!(generation, code, reason = %reason, "Push channel closed"),
            None => info!(generation, "Push channel closed"),
        }
        self.handle_close(generation, close);
    }

    fn mark_open(&self, generation: u64, outbound: mpsc::UnboundedSender<String>) -> bool {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.generation != generation {
            return false;
        }
        let Some(link) = state.link.as_mut().filter(|link| link.generation == generation) else {
            return false;
        };

        link.mark_open(outbound);
        state.phase = ConnectionState::Open;
        state.reconnect.reset();
        self.metrics.connection_opened();
        info!(generation, "Push channel open");
        true
    }

    /// Emits `connected` unless a disconnect superseded this connection
    /// after it opened; that disconnect already reported the close.
    fn announce_open(&self, generation: u64) -> bool {
        if !self.is_current(generation) {
            debug!(generation, "Connection superseded before announcing open");
            return false;
        }
        self.emit(EventKind::Connected, &Value::Null);
        true
    }

    fn handle_frame(&self, raw: &str) {
        self.metrics.frame_received();
        match envelope::decode(raw, self.max_frame_bytes) {
            Ok(frame) => {
                trace!(event = %frame.event_type, "Frame received");
                self.dispatcher.emit(&frame.event_type, &frame.payload);
            }
            Err(e) => {
                self.metrics.frame_malformed();
                warn!(error = %e, bytes = raw.len(), "Dropping malformed frame");
            }
        }
    }

    /// Clears the link and schedules the next attempt or gives up.
    fn handle_close(self: &Arc<Self>, generation: u64, close: Option<(u16, String)>) {
        let max_attempts = self.policy.max_attempts;
        let exhausted = {
            let mut guard = self.lock();
            let state = &mut *guard;
            if state.generation != generation {
                debug!(generation, ?close, "Ignoring close of superseded connection");
                return;
            }
            state.link = None;

            match state.reconnect.next_attempt(&self.policy) {
                Some(attempt) => {
                    let token = CancellationToken::new();
                    state.reconnect.pending = Some(token.clone());
                    state.phase = ConnectionState::Reconnecting { attempt };
                    self.metrics.reconnect_scheduled();
                    info!(
                        attempt,
                        max_attempts,
                        delay_ms = self.policy.delay.as_millis() as u64,
                        "Scheduling reconnect"
                    );
                    self.schedule_reconnect(generation, token);
                    false
                }
                None => {
                    state.phase = ConnectionState::Disconnected;
                    true
                }
            }
        };

        self.emit(EventKind::Disconnected, &Value::Null);

        if exhausted {
            warn!(attempts = max_attempts, "Reconnect attempts exhausted; giving up");
            self.emit(EventKind::ReconnectFailed, &json!({ "attempts": max_attempts }));
        }
    }

    fn schedule_reconnect(self: &Arc<Self>, generation: u64, token: CancellationToken) {
        let shared = Arc::clone(self);
        let delay = self.policy.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => debug!(generation, "Pending reconnect cancelled"),
                _ = tokio::time::sleep(delay) => shared.reopen(generation, &token),
            }
        });
    }

    fn reopen(self: &Arc<Self>, generation: u64, token: &CancellationToken) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.generation != generation || token.is_cancelled() {
            return;
        }
        state.reconnect.pending = None;
        self.begin_open(state);
    }
}
