//! # campus-admin-core
//!
//! Core crate for the campus marketplace admin dashboard. Contains the
//! configuration schemas, the unified error system, the push-channel
//! credential type, and the typed payloads of marketplace events.
//!
//! This crate has **no** internal dependencies on other dashboard crates.

pub mod config;
pub mod credential;
pub mod error;
pub mod events;
pub mod result;

pub use credential::Credential;
pub use error::AppError;
pub use result::AppResult;
