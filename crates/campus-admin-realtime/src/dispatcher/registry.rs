//! Listener registry: event name to ordered callbacks.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, trace};

use crate::message::types::ServerEvent;
use crate::metrics::RealtimeMetrics;

use super::listener::Listener;
use super::subscription::Subscription;

/// Publish/subscribe registry shared by the connection manager and the UI.
///
/// Listeners registered under one name run in registration order. The
/// registry is never cleared implicitly: registrations survive reconnects
/// and only an explicit unsubscribe removes them.
#[derive(Debug)]
pub struct EventDispatcher {
    /// Event name → listeners in registration order.
    listeners: DashMap<String, Vec<Listener>>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
}

impl EventDispatcher {
    /// Creates an empty dispatcher.
    pub fn new(metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            listeners: DashMap::new(),
            metrics,
        }
    }

    /// Appends a listener for `event`.
    ///
    /// Registering the same listener twice makes it run twice per emit;
    /// pair every subscribe with one unsubscribe.
    pub fn subscribe(&self, event: impl Into<String>, listener: Listener) {
        let event = event.into();
        trace!(event = %event, "Listener subscribed");
        self.listeners.entry(event).or_default().push(listener);
    }

    /// Appends a listener that receives the payload decoded as `T`.
    ///
    /// Returns the listener so the caller can unsubscribe it later.
    pub fn subscribe_typed<T, F>(&self, event: impl Into<String>, f: F) -> Listener
    where
        T: DeserializeOwned,
        F: Fn(T) + Send + Sync + 'static,
    {
        let listener = Listener::typed(f);
        self.subscribe(event, listener.clone());
        listener
    }

    /// Removes the first registration of `listener` under `event`.
    ///
    /// Returns whether anything was removed. Unknown events or listeners are
    /// a no-op.
    pub fn unsubscribe(&self, event: &str, listener: &Listener) -> bool {
        let removed = match self.listeners.get_mut(event) {
            Some(mut list) => match list.iter().position(|l| l.same_as(listener)) {
                Some(index) => {
                    list.remove(index);
                    true
                }
                None => false,
            },
            None => false,
        };

        if removed {
            self.listeners.remove_if(event, |_, list| list.is_empty());
            trace!(event = %event, "Listener unsubscribed");
        }
        removed
    }

    /// Subscribes and returns a guard that unsubscribes when dropped.
    pub fn listen(self: &Arc<Self>, event: impl Into<String>, listener: Listener) -> Subscription {
        let event = event.into();
        self.subscribe(event.clone(), listener.clone());
        Subscription::new(Arc::downgrade(self), event, listener)
    }

    /// Subscribes a [`ServerEvent`] callback and returns its guard.
    pub fn listen_event<F>(self: &Arc<Self>, event: impl Into<String>, f: F) -> Subscription
    where
        F: Fn(ServerEvent) + Send + Sync + 'static,
    {
        let event = event.into();
        let listener = Listener::server_event(event.clone(), f);
        self.listen(event, listener)
    }

    /// Invokes every listener registered for `event`, in order.
    ///
    /// Iterates a snapshot taken before the first call, so listeners added
    /// or removed by a callback take effect from the next emit. A panicking
    /// listener is logged and does not stop the remaining ones. Returns the
    /// number of listeners invoked.
    pub(crate) fn emit(&self, event: &str, payload: &Value) -> usize {
        let snapshot = match self.listeners.get(event) {
            Some(list) => list.clone(),
            None => return 0,
        };

        for listener in &snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.call(payload)));
            if let Err(cause) = outcome {
                self.metrics.listener_panicked();
                error!(
                    event = %event,
                    panic = %panic_message(cause.as_ref()),
                    "Listener panicked during dispatch"
                );
            }
        }

        snapshot.len()
    }

    /// Number of registrations for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map(|list| list.len()).unwrap_or(0)
    }

    /// Event names that currently have at least one listener.
    pub fn event_names(&self) -> Vec<String> {
        self.listeners.iter().map(|entry| entry.key().clone()).collect()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    fn dispatcher() -> Arc<EventDispatcher> {
        Arc::new(EventDispatcher::new(Arc::new(RealtimeMetrics::new())))
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> Listener {
        let log = log.clone();
        let tag = tag.to_string();
        Listener::new(move |payload| log.lock().unwrap().push(format!("{tag}:{payload}")))
    }

    #[test]
    fn test_emit_in_registration_order() {
        let dispatcher = dispatcher();
        let log = Arc::new(Mutex::new(Vec::new()));
        dispatcher.subscribe("new-deal", recorder(&log, "a"));
        dispatcher.subscribe("new-deal", recorder(&log, "b"));
        dispatcher.subscribe("new-user", recorder(&log, "other"));

        let invoked = dispatcher.emit("new-deal", &json!(1));

        assert_eq!(invoked, 2);
        assert_eq!(*log.lock().unwrap(), vec!["a:1", "b:1"]);
    }

    #[test]
    fn test_new_deal_scenario() {
        let dispatcher = dispatcher();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let c1 = Listener::new(move |payload| sink.lock().unwrap().push(payload.clone()));

        dispatcher.subscribe("new-deal", c1.clone());
        dispatcher.emit("new-deal", &json!({"id": "D1"}));
        assert_eq!(*received.lock().unwrap(), vec![json!({"id": "D1"})]);

        assert!(dispatcher.unsubscribe("new-deal", &c1));
        dispatcher.emit("new-deal", &json!({"id": "D1"}));
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let dispatcher = dispatcher();
        let listener = Listener::new(|_| {});
        assert!(!dispatcher.unsubscribe("nothing", &listener));

        dispatcher.subscribe("new-user", Listener::new(|_| {}));
        assert!(!dispatcher.unsubscribe("new-user", &listener));
        assert_eq!(dispatcher.listener_count("new-user"), 1);
    }

    #[test]
    fn test_duplicate_subscribe_runs_twice() {
        let dispatcher = dispatcher();
        let log = Arc::new(Mutex::new(Vec::new()));
        let listener = recorder(&log, "dup");
        dispatcher.subscribe("new-report", listener.clone());
        dispatcher.subscribe("new-report", listener.clone());

        dispatcher.emit("new-report", &Value::Null);
        assert_eq!(log.lock().unwrap().len(), 2);

        // One unsubscribe removes one registration.
        dispatcher.unsubscribe("new-report", &listener);
        dispatcher.emit("new-report", &Value::Null);
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let dispatcher = dispatcher();
        let log = Arc::new(Mutex::new(Vec::new()));
        dispatcher.subscribe("new-listing", recorder(&log, "before"));
        dispatcher.subscribe("new-listing", Listener::new(|_| panic!("listener bug")));
        dispatcher.subscribe("new-listing", recorder(&log, "after"));

        let invoked = dispatcher.emit("new-listing", &json!("x"));

        assert_eq!(invoked, 3);
        assert_eq!(*log.lock().unwrap(), vec!["before:\"x\"", "after:\"x\""]);
        assert_eq!(dispatcher.metrics.snapshot().listener_panics, 1);
    }

    #[test]
    fn test_mutation_during_emit_uses_snapshot() {
        let dispatcher = dispatcher();
        let log = Arc::new(Mutex::new(Vec::new()));
        let late = recorder(&log, "late");

        let inner = dispatcher.clone();
        let late_clone = late.clone();
        dispatcher.subscribe(
            "connected",
            Listener::new(move |_| inner.subscribe("connected", late_clone.clone())),
        );

        dispatcher.emit("connected", &Value::Null);
        assert!(log.lock().unwrap().is_empty());

        dispatcher.emit("connected", &Value::Null);
        assert_eq!(*log.lock().unwrap(), vec!["late:null"]);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let dispatcher = dispatcher();
        let count = Arc::new(Mutex::new(0));

        let slot: Arc<Mutex<Option<Listener>>> = Arc::new(Mutex::new(None));
        let inner = dispatcher.clone();
        let counter = count.clone();
        let self_ref = slot.clone();
        let once = Listener::new(move |_| {
            *counter.lock().unwrap() += 1;
            if let Some(me) = self_ref.lock().unwrap().take() {
                inner.unsubscribe("error", &me);
            }
        });
        *slot.lock().unwrap() = Some(once.clone());
        dispatcher.subscribe("error", once);

        dispatcher.emit("error", &Value::Null);
        dispatcher.emit("error", &Value::Null);
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(dispatcher.listener_count("error"), 0);
    }

    #[test]
    fn test_listen_guard_unsubscribes_on_drop() {
        let dispatcher = dispatcher();
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let _guard = dispatcher.listen("new-user", recorder(&log, "scoped"));
            assert_eq!(dispatcher.listener_count("new-user"), 1);
            dispatcher.emit("new-user", &json!(1));
        }
        assert_eq!(dispatcher.listener_count("new-user"), 0);
        dispatcher.emit("new-user", &json!(2));
        assert_eq!(*log.lock().unwrap(), vec!["scoped:1"]);
    }

    #[test]
    fn test_listen_event_decodes() {
        let dispatcher = dispatcher();
        let titles = Arc::new(Mutex::new(Vec::new()));
        let sink = titles.clone();
        let _guard = dispatcher.listen_event("new-listing", move |event| {
            if let ServerEvent::NewListing(listing) = event {
                sink.lock().unwrap().push(listing.title);
            }
        });

        dispatcher.emit("new-listing", &json!({"id": "L1", "title": "Mini fridge"}));
        dispatcher.emit("new-listing", &json!(["not", "an", "object"]));

        assert_eq!(*titles.lock().unwrap(), vec!["Mini fridge".to_string()]);
    }

    #[test]
    fn test_subscribe_typed_skips_undecodable() {
        let dispatcher = dispatcher();
        let ids = Arc::new(Mutex::new(Vec::new()));
        let sink = ids.clone();
        let listener = dispatcher.subscribe_typed("new-deal", move |deal: campus_admin_core::events::DealNotice| {
            sink.lock().unwrap().push(deal.id)
        });

        dispatcher.emit("new-deal", &json!({"id": "D7"}));
        dispatcher.emit("new-deal", &json!(42));
        assert_eq!(*ids.lock().unwrap(), vec!["D7".to_string()]);

        assert!(dispatcher.unsubscribe("new-deal", &listener));
    }
}
