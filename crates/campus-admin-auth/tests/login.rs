//! Auth client and session against an in-process stub of the admin API.

use std::net::SocketAddr;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use campus_admin_auth::{AdminRole, AuthClient, AuthSession};
use campus_admin_core::Credential;
use campus_admin_core::config::api::ApiConfig;
use campus_admin_core::error::ErrorKind;

const TOKEN: &str = "tok-123";

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "admin@campus.edu" && body["password"] == "hunter2" {
        (
            StatusCode::OK,
            Json(json!({
                "token": TOKEN,
                "admin": {"id": "A1", "email": "admin@campus.edu", "name": "Ops", "role": "SuperAdmin"}
            })),
        )
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({"msg": "Invalid credentials"})))
    }
}

async fn me(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    match headers.get("x-auth-token").and_then(|v| v.to_str().ok()) {
        Some(TOKEN) => Ok(Json(json!({"_id": "A1", "email": "admin@campus.edu", "role": "SuperAdmin"}))),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn start_stub() -> SocketAddr {
    serve(
        Router::new()
            .route("/api/admin/login", post(login))
            .route("/api/admin/me", get(me)),
    )
    .await
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config(addr: SocketAddr) -> ApiConfig {
    ApiConfig {
        base_url: format!("http://{addr}/api/"),
        ..ApiConfig::default()
    }
}

#[tokio::test]
async fn test_login_success() {
    let addr = start_stub().await;
    let client = AuthClient::new(&config(addr)).unwrap();

    let response = client.login("admin@campus.edu", "hunter2").await.unwrap();

    assert_eq!(response.token.as_str(), TOKEN);
    assert_eq!(response.admin.role, AdminRole::SuperAdmin);
    assert_eq!(response.admin.name.as_deref(), Some("Ops"));
}

#[tokio::test]
async fn test_login_bad_password_is_authentication_error() {
    let addr = start_stub().await;
    let client = AuthClient::new(&config(addr)).unwrap();

    let err = client.login("admin@campus.edu", "wrong").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(err.message, "Invalid credentials");
}

#[tokio::test]
async fn test_me_with_expired_token() {
    let addr = start_stub().await;
    let client = AuthClient::new(&config(addr)).unwrap();

    let err = client.me(&Credential::new("stale")).await.unwrap_err();
    assert!(err.is_authentication());

    let admin = client.me(&Credential::new(TOKEN)).await.unwrap();
    assert_eq!(admin.id, "A1");
}

#[tokio::test]
async fn test_session_publishes_credentials() {
    let addr = start_stub().await;
    let session = AuthSession::new(AuthClient::new(&config(addr)).unwrap());
    let mut rx = session.subscribe();

    session.login("admin@campus.edu", "hunter2").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().as_ref().map(Credential::as_str), Some(TOKEN));
    assert!(session.is_authenticated());

    session.logout();
    assert!(rx.borrow_and_update().is_none());
    assert!(session.current_admin().is_none());
}

#[tokio::test]
async fn test_restore_rejected_credential_signs_out() {
    let addr = start_stub().await;
    let session = AuthSession::new(AuthClient::new(&config(addr)).unwrap());

    let admin = session.restore(Credential::new(TOKEN)).await.unwrap();
    assert_eq!(admin.email, "admin@campus.edu");
    assert!(session.is_authenticated());

    let err = session.restore(Credential::new("stale")).await.unwrap_err();
    assert!(err.is_authentication());
    assert!(!session.is_authenticated());
    assert!(session.credential().is_none());
}

#[tokio::test]
async fn test_unreachable_api_is_external_service_error() {
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = AuthClient::new(&config(addr)).unwrap();

    let err = client.login("admin@campus.edu", "hunter2").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);
}

#[tokio::test]
async fn test_plain_text_rejection_is_authentication_error() {
    // A proxy in front of the API answering without a JSON body.
    let addr = serve(Router::new().route(
        "/api/admin/login",
        post(|| async { (StatusCode::UNAUTHORIZED, "Unauthorized") }),
    ))
    .await;
    let client = AuthClient::new(&config(addr)).unwrap();

    let err = client.login("admin@campus.edu", "hunter2").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(err.message, "Invalid credentials");
}

#[tokio::test]
async fn test_unreadable_success_body_is_serialization_error() {
    let addr = serve(Router::new().route("/api/admin/login", post(|| async { "<html>ok</html>" }))).await;
    let client = AuthClient::new(&config(addr)).unwrap();

    let err = client.login("admin@campus.edu", "hunter2").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Serialization);
}
