//! Deal notices pushed when a buyer and seller close a deal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of a `new-deal` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealNotice {
    /// Deal ID.
    pub id: String,
    /// Listing the deal was made on.
    pub listing_id: Option<String>,
    /// Buyer user ID.
    pub buyer_id: Option<String>,
    /// Seller user ID.
    pub seller_id: Option<String>,
    /// Price both parties agreed on.
    pub agreed_price: Option<f64>,
    /// Deal status (`PENDING`, `COMPLETED`, `DISPUTED`).
    pub status: Option<String>,
    /// Title of the listed item, for display.
    pub item_title: Option<String>,
    /// When the deal was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl DealNotice {
    /// One-line notification text.
    pub fn summary(&self) -> String {
        format!(
            "New deal completed: {}",
            self.item_title.as_deref().unwrap_or("unknown item")
        )
    }
}
