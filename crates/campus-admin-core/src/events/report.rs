//! Report notices pushed when a user files a report or dispute.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of a `new-report` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportNotice {
    /// Report ID.
    pub id: String,
    /// Report type (e.g. `scam`, `dispute`, `inappropriate`).
    #[serde(rename = "type")]
    pub report_type: String,
    /// Free-text reason.
    pub reason: Option<String>,
    /// Reporting user ID.
    pub reporter_id: Option<String>,
    /// ID of the reported user, listing, or deal.
    pub target_id: Option<String>,
    /// When the report was filed.
    pub created_at: Option<DateTime<Utc>>,
}

impl ReportNotice {
    /// One-line notification text.
    pub fn summary(&self) -> String {
        format!("New report filed: {}", self.report_type)
    }
}
