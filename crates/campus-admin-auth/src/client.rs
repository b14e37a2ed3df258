//! REST client for the admin authentication endpoints.

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use campus_admin_core::Credential;
use campus_admin_core::config::api::ApiConfig;
use campus_admin_core::error::{AppError, ErrorKind};
use campus_admin_core::result::AppResult;

use crate::model::{AdminUser, LoginReply, LoginRequest, LoginResponse, MeReply};

/// HTTP client for `/admin/login` and `/admin/me`.
#[derive(Debug, Clone)]
pub struct AuthClient {
    /// HTTP client
    http: reqwest::Client,
    /// API settings
    config: ApiConfig,
}

impl AuthClient {
    /// Create a client with the configured request timeout.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e))?;
        Ok(Self::with_http(http, config))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            config: config.clone(),
        }
    }

    /// Exchange email and password for a credential.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }

        let url = self.config.endpoint("/admin/login");
        debug!(url = %url, "Logging in");
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AppError::external_service(format!("Login failed with HTTP {status}")));
        }

        let body = response.text().await.map_err(request_error)?;
        let reply = serde_json::from_str::<LoginReply>(&body);

        if status.is_client_error() {
            let reason = reply
                .ok()
                .and_then(|reply| reply.msg)
                .unwrap_or_else(|| "Invalid credentials".to_string());
            warn!(status = %status, reason = %reason, "Login rejected");
            return Err(AppError::authentication(reason));
        }

        let reply = reply.map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Unreadable login response", e)
        })?;

        match (reply.token, reply.admin) {
            (Some(token), Some(admin)) if status.is_success() && !token.is_empty() => {
                info!(admin_id = %admin.id, role = %admin.role, "Admin signed in");
                Ok(LoginResponse {
                    token: Credential::new(token),
                    admin,
                })
            }
            _ => {
                let reason = reply.msg.unwrap_or_else(|| "Invalid credentials".to_string());
                warn!(status = %status, reason = %reason, "Login response carried no token");
                Err(AppError::authentication(reason))
            }
        }
    }

    /// Look up the admin a credential belongs to.
    pub async fn me(&self, credential: &Credential) -> AppResult<AdminUser> {
        let url = self.config.endpoint("/admin/me");
        let response = self
            .http
            .get(&url)
            .header(self.config.auth_header.as_str(), credential.as_str())
            .send()
            .await
            .map_err(request_error)?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(AppError::authentication("Credential expired or invalid")),
            status if !status.is_success() => Err(AppError::external_service(format!(
                "GET /admin/me failed with HTTP {status}"
            ))),
            _ => {
                let reply: MeReply = response.json().await.map_err(|e| {
                    AppError::with_source(ErrorKind::Serialization, "Unreadable /admin/me response", e)
                })?;
                Ok(reply.into_admin())
            }
        }
    }
}

fn request_error(err: reqwest::Error) -> AppError {
    let message = if err.is_timeout() {
        "Request to admin API timed out".to_string()
    } else {
        format!("Request to admin API failed: {err}")
    };
    AppError::with_source(ErrorKind::ExternalService, message, err)
}
