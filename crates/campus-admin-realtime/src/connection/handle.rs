//! The live link to one open (or opening) push channel.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle the manager keeps for the connection task it spawned.
///
/// Dropping the handle does not stop the task; call [`LinkHandle::shutdown`].
/// Frames already queued are written before the task closes the channel.
#[derive(Debug)]
pub(crate) struct LinkHandle {
    /// Generation the task was spawned under.
    pub generation: u64,
    /// Stops the connection task.
    pub cancel: CancellationToken,
    /// Outbound text frames. Set once the channel is open.
    pub outbound: Option<mpsc::UnboundedSender<String>>,
    /// When the channel opened.
    pub opened_at: Option<DateTime<Utc>>,
    /// The connection task.
    pub task: Option<JoinHandle<()>>,
}

impl LinkHandle {
    /// Handle for a task that is still connecting.
    pub fn connecting(generation: u64, cancel: CancellationToken) -> Self {
        Self {
            generation,
            cancel,
            outbound: None,
            opened_at: None,
            task: None,
        }
    }

    /// Record that the channel opened.
    pub fn mark_open(&mut self, outbound: mpsc::UnboundedSender<String>) {
        self.outbound = Some(outbound);
        self.opened_at = Some(Utc::now());
    }

    /// Whether the channel reached the open state.
    pub fn is_open(&self) -> bool {
        self.outbound.is_some()
    }

    /// Queue a text frame for the connection task.
    pub fn send(&self, text: String) -> bool {
        match &self.outbound {
            Some(tx) => tx.send(text).is_ok(),
            None => false,
        }
    }

    /// Stop the connection task. Returns its join handle.
    pub fn shutdown(self) -> Option<JoinHandle<()>> {
        self.cancel.cancel();
        self.task
    }
}
