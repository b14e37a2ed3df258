//! Listing notices pushed when a seller publishes a listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of a `new-listing` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingNotice {
    /// Listing ID.
    pub id: String,
    /// Listing title.
    pub title: String,
    /// Asking price.
    pub price: Option<f64>,
    /// Category name.
    pub category: Option<String>,
    /// Seller user ID.
    pub seller: Option<String>,
    /// Listing status (`ACTIVE`, `PENDING`, `SUSPENDED`, `SOLD`).
    pub status: Option<String>,
    /// University the listing belongs to.
    pub university: Option<String>,
    /// When the listing was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl ListingNotice {
    /// One-line notification text.
    pub fn summary(&self) -> String {
        format!("New listing created: {}", self.title)
    }
}
