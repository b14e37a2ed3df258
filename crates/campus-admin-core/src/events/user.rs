//! User notices pushed on registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of a `new-user` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserNotice {
    /// User ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Option<String>,
    /// Marketplace role (`GENERAL`, `SELLER`, `PREMIUM_SELLER`).
    pub role: Option<String>,
    /// University the user registered with.
    pub university: Option<String>,
    /// When the account was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl UserNotice {
    /// One-line notification text.
    pub fn summary(&self) -> String {
        format!("New user registered: {}", self.name)
    }
}
