//! Listener callbacks and their identity.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::message::types::ServerEvent;

type Callback = dyn Fn(&Value) + Send + Sync;

/// A registered callback.
///
/// Clones share identity: unsubscribing with any clone removes the
/// registration made with another clone of the same listener. Two listeners
/// built from separate closures are always distinct, even if the closures
/// are identical.
#[derive(Clone)]
pub struct Listener {
    callback: Arc<Callback>,
}

impl Listener {
    /// Listener receiving the raw JSON payload.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(f),
        }
    }

    /// Listener receiving the payload decoded as `T`.
    ///
    /// Payloads that do not decode are logged and skipped for this listener
    /// only.
    pub fn typed<T, F>(f: F) -> Self
    where
        T: DeserializeOwned,
        F: Fn(T) + Send + Sync + 'static,
    {
        Self::new(move |payload| match T::deserialize(payload) {
            Ok(value) => f(value),
            Err(e) => tracing::warn!(
                error = %e,
                target_type = std::any::type_name::<T>(),
                "Dropping event with undecodable payload"
            ),
        })
    }

    /// Listener receiving a [`ServerEvent`] decoded for `event_type`.
    pub fn server_event<F>(event_type: impl Into<String>, f: F) -> Self
    where
        F: Fn(ServerEvent) + Send + Sync + 'static,
    {
        let event_type = event_type.into();
        Self::new(move |payload| match ServerEvent::decode(&event_type, payload) {
            Ok(event) => f(event),
            Err(e) => tracing::warn!(event = %event_type, error = %e, "Dropping malformed event"),
        })
    }

    pub(crate) fn call(&self, payload: &Value) {
        (self.callback)(payload)
    }

    /// Whether both handles refer to the same registration identity.
    pub fn same_as(&self, other: &Listener) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.callback), Arc::as_ptr(&other.callback))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("ptr", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_clone_shares_identity() {
        let a = Listener::new(|_| {});
        let b = a.clone();
        let c = Listener::new(|_| {});
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn test_typed_listener_skips_bad_payload() {
        #[derive(serde::Deserialize)]
        struct Ping {
            seq: u32,
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener = Listener::typed(move |ping: Ping| sink.lock().unwrap().push(ping.seq));

        listener.call(&json!({"seq": 3}));
        listener.call(&json!("garbage"));
        listener.call(&json!({"seq": 4}));

        assert_eq!(*seen.lock().unwrap(), vec![3, 4]);
    }
}
