//! Marketplace events pushed to the dashboard.
//!
//! The backend announces activity over the push channel as
//! `{ "type": "<name>", "payload": ... }` frames. [`EventKind`] is the closed
//! set of names the dashboard understands; the payload structs in the
//! sub-modules are what those frames carry.

pub mod deal;
pub mod listing;
pub mod report;
pub mod user;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use deal::DealNotice;
pub use listing::ListingNotice;
pub use report::ReportNotice;
pub use user::UserNotice;

/// Known event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A deal was completed.
    NewDeal,
    /// A listing was published.
    NewListing,
    /// A user registered.
    NewUser,
    /// A report was filed.
    NewReport,
    /// The push channel opened. Local only.
    Connected,
    /// The push channel closed. Local only.
    Disconnected,
    /// The transport reported an error. Local only.
    Error,
    /// Reconnect attempts are exhausted. Local only.
    ReconnectFailed,
}

impl EventKind {
    /// Events that arrive over the wire.
    pub const WIRE: [EventKind; 4] = [
        EventKind::NewDeal,
        EventKind::NewListing,
        EventKind::NewUser,
        EventKind::NewReport,
    ];

    /// Events the client emits locally and never sends.
    pub const SYNTHETIC: [EventKind; 4] = [
        EventKind::Connected,
        EventKind::Disconnected,
        EventKind::Error,
        EventKind::ReconnectFailed,
    ];

    /// The event name as used in frames and listener registration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewDeal => "new-deal",
            Self::NewListing => "new-listing",
            Self::NewUser => "new-user",
            Self::NewReport => "new-report",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
            Self::ReconnectFailed => "reconnect-failed",
        }
    }

    /// Look up a known event by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::WIRE
            .into_iter()
            .chain(Self::SYNTHETIC)
            .find(|kind| kind.as_str() == name)
    }

    /// Whether this event is generated locally rather than received.
    pub fn is_synthetic(self) -> bool {
        Self::SYNTHETIC.contains(&self)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| crate::error::AppError::validation(format!("Unknown event kind: {s}")))
    }
}
