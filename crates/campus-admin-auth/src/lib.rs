//! # campus-admin-auth
//!
//! Admin authentication against the marketplace REST API and the session
//! state that decides when the push channel should be connected.
//!
//! ## Modules
//!
//! - `client`: `POST /admin/login` and `GET /admin/me`
//! - `model`: admin account and login payloads
//! - `session`: signed-in admin plus a watch channel of the current credential

pub mod client;
pub mod model;
pub mod session;

pub use client::AuthClient;
pub use model::{AdminRole, AdminUser, LoginResponse};
pub use session::AuthSession;
