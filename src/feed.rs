//! Live dashboard counters and the recent-notification list.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::info;

use campus_admin_core::events::EventKind;
use campus_admin_realtime::{RealtimeService, ServerEvent, Subscription};

/// Notifications kept in [`FeedState::recent`].
pub const RECENT_LIMIT: usize = 5;

/// What the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedState {
    /// Whether the push channel is open.
    pub connected: bool,
    /// Completed deals.
    pub completed_deals: u64,
    /// Active listings.
    pub active_listings: u64,
    /// Registered users.
    pub total_users: u64,
    /// Open reports.
    pub reported_issues: u64,
    /// Newest first.
    pub recent: VecDeque<String>,
}

impl FeedState {
    /// Fold one event into the state. Returns the notification line it added.
    pub fn apply(&mut self, event: &ServerEvent) -> Option<String> {
        match event {
            ServerEvent::NewDeal(_) => self.completed_deals += 1,
            ServerEvent::NewListing(_) => self.active_listings += 1,
            ServerEvent::NewUser(_) => self.total_users += 1,
            ServerEvent::NewReport(_) => self.reported_issues += 1,
            ServerEvent::Connected => {
                self.connected = true;
                return None;
            }
            ServerEvent::Disconnected => {
                self.connected = false;
                return None;
            }
            _ => return None,
        }

        let line = event.summary();
        self.recent.push_front(line.clone());
        self.recent.truncate(RECENT_LIMIT);
        Some(line)
    }

    /// Like [`apply`](Self::apply), with `connected` taken from the link
    /// state at delivery time. A `connected` that arrives after the link
    /// already closed leaves the flag cleared.
    pub fn observe(&mut self, event: &ServerEvent, link_open: bool) -> Option<String> {
        let line = self.apply(event);
        if matches!(event, ServerEvent::Connected | ServerEvent::Disconnected) {
            self.connected = link_open;
        }
        line
    }
}

/// Feed state kept current by push-channel events.
///
/// Registrations are removed when the feed is dropped.
#[derive(Debug)]
pub struct DashboardFeed {
    state: Arc<Mutex<FeedState>>,
    _subscriptions: Vec<Subscription>,
}

impl DashboardFeed {
    /// Subscribe to the events the dashboard follows.
    pub fn attach(service: &RealtimeService) -> Self {
        let state = Arc::new(Mutex::new(FeedState {
            connected: service.is_connected(),
            ..FeedState::default()
        }));

        let followed = EventKind::WIRE
            .into_iter()
            .chain([EventKind::Connected, EventKind::Disconnected]);
        let subscriptions = followed
            .map(|kind| {
                let state = state.clone();
                let connection = service.connection.clone();
                service.listen_event(kind.as_str(), move |event| {
                    let open = connection.is_connected();
                    let line = state
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .observe(&event, open);
                    if let Some(line) = line {
                        info!(event = event.event_type(), "{line}");
                    }
                })
            })
            .collect();

        Self {
            state,
            _subscriptions: subscriptions,
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> FeedState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
