//! `{ "type": ..., "payload": ... }` frame envelope shared by both directions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use campus_admin_core::error::AppError;

use super::validator;

/// A decoded push-channel frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload. Absent payloads decode as `null`.
    #[serde(default)]
    pub payload: Value,
}

/// Borrowed form used for encoding without cloning the payload.
#[derive(Serialize)]
struct OutboundEnvelope<'a, T: ?Sized> {
    #[serde(rename = "type")]
    event_type: &'a str,
    payload: &'a T,
}

impl Envelope {
    /// Create an envelope.
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

/// Encode an outbound frame.
pub fn encode<T: Serialize + ?Sized>(event_type: &str, payload: &T) -> Result<String, AppError> {
    validator::validate_event_name(event_type)?;
    Ok(serde_json::to_string(&OutboundEnvelope {
        event_type,
        payload,
    })?)
}

/// Decode an inbound text frame, enforcing the size limit.
pub fn decode(raw: &str, max_bytes: usize) -> Result<Envelope, AppError> {
    validator::validate_frame(raw, max_bytes)?;
    let envelope: Envelope = serde_json::from_str(raw)?;
    validator::validate_event_name(&envelope.event_type)?;
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_encode_shape() {
        let text = encode("moderate-listing", &json!({"id": "L7"})).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, json!({"type": "moderate-listing", "payload": {"id": "L7"}}));
    }

    #[test]
    fn test_decode_missing_payload_is_null() {
        let envelope = decode(r#"{"type":"new-user"}"#, 1024).unwrap();
        assert_eq!(envelope.event_type, "new-user");
        assert_eq!(envelope.payload, Value::Null);
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(decode("not json", 1024).is_err());
    }

    #[test]
    fn test_decode_rejects_missing_type() {
        assert!(decode(r#"{"payload":{"id":"D1"}}"#, 1024).is_err());
        assert!(decode(r#"{"type":42,"payload":null}"#, 1024).is_err());
    }

    #[test]
    fn test_decode_rejects_oversized_frame() {
        let raw = format!(r#"{{"type":"new-deal","payload":"{}"}}"#, "x".repeat(64));
        assert!(decode(&raw, 32).is_err());
    }
}
