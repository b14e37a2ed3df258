//! Signed-in admin state.

use std::sync::RwLock;

use tokio::sync::watch;
use tracing::{info, warn};

use campus_admin_core::Credential;
use campus_admin_core::result::AppResult;

use crate::client::AuthClient;
use crate::model::AdminUser;

/// The admin session.
///
/// The current credential is published on a watch channel so the push
/// channel can follow login and logout without this crate knowing about it.
#[derive(Debug)]
pub struct AuthSession {
    client: AuthClient,
    admin: RwLock<Option<AdminUser>>,
    credentials: watch::Sender<Option<Credential>>,
}

impl AuthSession {
    /// Create a signed-out session.
    pub fn new(client: AuthClient) -> Self {
        let (credentials, _) = watch::channel(None);
        Self {
            client,
            admin: RwLock::new(None),
            credentials,
        }
    }

    /// Receiver that observes every credential change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.credentials.subscribe()
    }

    /// Sign in and publish the new credential.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AdminUser> {
        let response = self.client.login(email, password).await?;
        self.adopt(response.admin.clone(), response.token);
        Ok(response.admin)
    }

    /// Adopt a stored credential after confirming it with `/admin/me`.
    ///
    /// A rejected credential signs the session out.
    pub async fn restore(&self, credential: Credential) -> AppResult<AdminUser> {
        match self.client.me(&credential).await {
            Ok(admin) => {
                self.adopt(admin.clone(), credential);
                Ok(admin)
            }
            Err(e) => {
                if e.is_authentication() {
                    warn!("Stored credential rejected; signing out");
                    self.logout();
                }
                Err(e)
            }
        }
    }

    /// Sign out and clear the published credential.
    pub fn logout(&self) {
        let previous = self.write_admin(None);
        self.credentials.send_replace(None);
        if let Some(admin) = previous {
            info!(admin_id = %admin.id, "Admin signed out");
        }
    }

    /// The signed-in admin.
    pub fn current_admin(&self) -> Option<AdminUser> {
        self.admin.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The current credential.
    pub fn credential(&self) -> Option<Credential> {
        self.credentials.borrow().clone()
    }

    /// Whether both an admin and a credential are present.
    pub fn is_authenticated(&self) -> bool {
        self.current_admin().is_some() && self.credentials.borrow().is_some()
    }

    fn adopt(&self, admin: AdminUser, credential: Credential) {
        self.write_admin(Some(admin));
        self.credentials.send_replace(Some(credential));
    }

    fn write_admin(&self, admin: Option<AdminUser>) -> Option<AdminUser> {
        let mut slot = self.admin.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *slot, admin)
    }
}

#[cfg(test)]
mod tests {
    use campus_admin_core::config::api::ApiConfig;

    use super::*;

    fn session() -> AuthSession {
        AuthSession::new(AuthClient::new(&ApiConfig::default()).unwrap())
    }

    #[test]
    fn test_starts_signed_out() {
        let session = session();
        assert!(!session.is_authenticated());
        assert!(session.credential().is_none());
    }

    #[test]
    fn test_logout_publishes_none() {
        let session = session();
        let rx = session.subscribe();
        session.adopt(
            AdminUser {
                id: "A1".to_string(),
                email: "a@campus.edu".to_string(),
                name: None,
                role: crate::model::AdminRole::SuperAdmin,
            },
            Credential::new("tok"),
        );
        assert!(session.is_authenticated());
        assert_eq!(rx.borrow().as_ref().map(Credential::as_str), Some("tok"));

        session.logout();
        assert!(!session.is_authenticated());
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_login_rejects_blank_input() {
        let err = session().login("  ", "pw").await.unwrap_err();
        assert_eq!(err.kind, campus_admin_core::error::ErrorKind::Validation);
    }
}
