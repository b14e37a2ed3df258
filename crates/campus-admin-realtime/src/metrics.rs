//! Push-channel client metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Client-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connections that reached the open state
    connections_opened: AtomicU64,
    /// Inbound frames received
    frames_received: AtomicU64,
    /// Inbound frames dropped as malformed
    frames_malformed: AtomicU64,
    /// Outbound frames handed to the transport
    frames_sent: AtomicU64,
    /// Outbound frames dropped because the channel was not open
    sends_dropped: AtomicU64,
    /// Reconnect attempts scheduled
    reconnects_scheduled: AtomicU64,
    /// Listener invocations that panicked
    listener_panics: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_malformed(&self) {
        self.frames_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn send_dropped(&self) {
        self.sends_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn reconnect_scheduled(&self) {
        self.reconnects_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn listener_panicked(&self) {
        self.listener_panics.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_malformed: self.frames_malformed.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            sends_dropped: self.sends_dropped.load(Ordering::Relaxed),
            reconnects_scheduled: self.reconnects_scheduled.load(Ordering::Relaxed),
            listener_panics: self.listener_panics.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections that reached the open state
    pub connections_opened: u64,
    /// Inbound frames received
    pub frames_received: u64,
    /// Inbound frames dropped as malformed
    pub frames_malformed: u64,
    /// Outbound frames handed to the transport
    pub frames_sent: u64,
    /// Outbound frames dropped while not connected
    pub sends_dropped: u64,
    /// Reconnect attempts scheduled
    pub reconnects_scheduled: u64,
    /// Listener invocations that panicked
    pub listener_panics: u64,
}
