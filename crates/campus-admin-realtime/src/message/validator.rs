//! Frame validation rules.

use campus_admin_core::error::AppError;

/// Longest accepted event name.
const MAX_EVENT_NAME_LEN: usize = 128;

/// Validates a raw inbound frame before parsing.
pub fn validate_frame(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty frame"));
    }

    Ok(())
}

/// Validates an event name.
pub fn validate_event_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() || name.len() > MAX_EVENT_NAME_LEN {
        return Err(AppError::validation("Invalid event name length"));
    }

    if name.chars().any(char::is_control) {
        return Err(AppError::validation(
            "Event name contains control characters",
        ));
    }

    Ok(())
}
