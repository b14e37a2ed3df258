//! Typed view of the events delivered to listeners.

use serde_json::Value;

use campus_admin_core::error::AppError;
use campus_admin_core::events::{DealNotice, EventKind, ListingNotice, ReportNotice, UserNotice};

/// An event decoded from its name and payload.
///
/// Known names get typed payloads; anything else is kept as raw JSON in
/// [`ServerEvent::Other`] so new backend events still reach listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// `new-deal`
    NewDeal(DealNotice),
    /// `new-listing`
    NewListing(ListingNotice),
    /// `new-user`
    NewUser(UserNotice),
    /// `new-report`
    NewReport(ReportNotice),
    /// `connected`
    Connected,
    /// `disconnected`
    Disconnected,
    /// `error`
    Error {
        /// Error detail reported by the transport.
        detail: String,
    },
    /// `reconnect-failed`
    ReconnectFailed {
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// An event name outside the known set.
    Other {
        /// Event name.
        event_type: String,
        /// Raw payload.
        payload: Value,
    },
}

impl ServerEvent {
    /// Decode an event from its name and payload.
    ///
    /// Fails only when a known name carries a payload of the wrong shape.
    pub fn decode(event_type: &str, payload: &Value) -> Result<Self, AppError> {
        let Some(kind) = EventKind::from_name(event_type) else {
            return Ok(Self::Other {
                event_type: event_type.to_string(),
                payload: payload.clone(),
            });
        };

        let event = match kind {
            EventKind::NewDeal => Self::NewDeal(typed(kind, payload)?),
            EventKind::NewListing => Self::NewListing(typed(kind, payload)?),
            EventKind::NewUser => Self::NewUser(typed(kind, payload)?),
            EventKind::NewReport => Self::NewReport(typed(kind, payload)?),
            EventKind::Connected => Self::Connected,
            EventKind::Disconnected => Self::Disconnected,
            EventKind::Error => Self::Error {
                detail: match payload {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                },
            },
            EventKind::ReconnectFailed => Self::ReconnectFailed {
                attempts: payload
                    .get("attempts")
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or_default(),
            },
        };
        Ok(event)
    }

    /// The event name this value was decoded from.
    pub fn event_type(&self) -> &str {
        match self {
            Self::NewDeal(_) => EventKind::NewDeal.as_str(),
            Self::NewListing(_) => EventKind::NewListing.as_str(),
            Self::NewUser(_) => EventKind::NewUser.as_str(),
            Self::NewReport(_) => EventKind::NewReport.as_str(),
            Self::Connected => EventKind::Connected.as_str(),
            Self::Disconnected => EventKind::Disconnected.as_str(),
            Self::Error { .. } => EventKind::Error.as_str(),
            Self::ReconnectFailed { .. } => EventKind::ReconnectFailed.as_str(),
            Self::Other { event_type, .. } => event_type,
        }
    }

    /// Human-readable one-line description.
    pub fn summary(&self) -> String {
        match self {
            Self::NewDeal(deal) => deal.summary(),
            Self::NewListing(listing) => listing.summary(),
            Self::NewUser(user) => user.summary(),
            Self::NewReport(report) => report.summary(),
            Self::Connected => "Live updates connected".to_string(),
            Self::Disconnected => "Live updates disconnected".to_string(),
            Self::Error { detail } => format!("Live updates error: {detail}"),
            Self::ReconnectFailed { attempts } => {
                format!("Live updates gave up after {attempts} reconnect attempts")
            }
            Self::Other {
                event_type,
                payload,
            } => format!("{event_type}: {payload}"),
        }
    }
}

fn typed<T: serde::de::DeserializeOwned>(kind: EventKind, payload: &Value) -> Result<T, AppError> {
    T::deserialize(payload).map_err(|e| {
        AppError::validation(format!("Malformed '{kind}' payload: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_known_event() {
        let event = ServerEvent::decode("new-listing", &json!({"id": "L1", "title": "Calculus textbook"}))
            .unwrap();
        match &event {
            ServerEvent::NewListing(listing) => assert_eq!(listing.title, "Calculus textbook"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(event.summary(), "New listing created: Calculus textbook");
        assert_eq!(event.event_type(), "new-listing");
    }

    #[test]
    fn test_decode_unknown_event_falls_back() {
        let event = ServerEvent::decode("new-chat", &json!({"id": "C9"})).unwrap();
        assert_eq!(
            event,
            ServerEvent::Other {
                event_type: "new-chat".to_string(),
                payload: json!({"id": "C9"}),
            }
        );
    }

    #[test]
    fn test_decode_wrong_shape_is_error() {
        assert!(ServerEvent::decode("new-user", &json!("just a string")).is_err());
    }

    #[test]
    fn test_decode_synthetic_events() {
        assert_eq!(
            ServerEvent::decode("connected", &Value::Null).unwrap(),
            ServerEvent::Connected
        );
        assert_eq!(
            ServerEvent::decode("error", &json!("connection refused")).unwrap(),
            ServerEvent::Error {
                detail: "connection refused".to_string()
            }
        );
        assert_eq!(
            ServerEvent::decode("reconnect-failed", &json!({"attempts": 5})).unwrap(),
            ServerEvent::ReconnectFailed { attempts: 5 }
        );
    }
}
