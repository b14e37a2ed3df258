//! Keeps the push channel in step with the signed-in credential.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use campus_admin_core::Credential;

use crate::service::RealtimeService;

/// Background task following a credential watch channel.
///
/// A new credential closes the current channel and opens one with the new
/// token; a cleared credential disconnects. Dropping the binding stops it
/// without touching the connection.
#[derive(Debug)]
pub struct SessionBinding {
    task: JoinHandle<()>,
}

impl SessionBinding {
    /// Starts following `credentials`. The current value is applied immediately.
    pub fn spawn(service: RealtimeService, mut credentials: watch::Receiver<Option<Credential>>) -> Self {
        let task = tokio::spawn(async move {
            let initial = credentials.borrow_and_update().clone();
            apply(&service, initial);

            while credentials.changed().await.is_ok() {
                let current = credentials.borrow_and_update().clone();
                apply(&service, current);
            }
            debug!("Credential source closed; session binding stopped");
        });
        Self { task }
    }

    /// Whether the binding task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SessionBinding {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn apply(service: &RealtimeService, credential: Option<Credential>) {
    match credential {
        Some(credential) => {
            info!("Session credential set; (re)opening push channel");
            service.disconnect();
            service.connect(credential);
        }
        None => {
            info!("Session cleared; closing push channel");
            service.disconnect();
        }
    }
}
