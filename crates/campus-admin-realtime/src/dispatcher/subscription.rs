//! Scoped subscriptions.

use std::sync::Weak;

use super::listener::Listener;
use super::registry::EventDispatcher;

/// Guard returned by [`EventDispatcher::listen`].
///
/// Dropping the guard removes exactly the registration it created. The
/// guard holds the dispatcher weakly and does nothing if the dispatcher is
/// already gone.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    dispatcher: Weak<EventDispatcher>,
    event: String,
    listener: Option<Listener>,
}

impl Subscription {
    pub(crate) fn new(dispatcher: Weak<EventDispatcher>, event: String, listener: Listener) -> Self {
        Self {
            dispatcher,
            event,
            listener: Some(listener),
        }
    }

    /// Event name this guard is registered under.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Unsubscribe now rather than at drop.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(listener) = self.listener.take() {
            if let Some(dispatcher) = self.dispatcher.upgrade() {
                dispatcher.unsubscribe(&self.event, &listener);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
