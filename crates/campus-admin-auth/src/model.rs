//! Admin account and login payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Admin permission tier as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdminRole {
    /// Full access.
    SuperAdmin,
    /// Listing and report moderation.
    Moderator,
    /// User support.
    Support,
    /// Read-only analytics.
    Analyst,
    /// A role this client does not know.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "SuperAdmin"),
            Self::Moderator => write!(f, "Moderator"),
            Self::Support => write!(f, "Support"),
            Self::Analyst => write!(f, "Analyst"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// The signed-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    /// Account ID. The backend sends `_id` on some routes.
    #[serde(alias = "_id")]
    pub id: String,
    /// Login email.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Permission tier.
    pub role: AdminRole,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /admin/login`. Failures carry `msg` instead of a token.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub admin: Option<AdminUser>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

/// Body of `GET /admin/me`, either bare or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MeReply {
    Wrapped { admin: AdminUser },
    Bare(AdminUser),
}

impl MeReply {
    pub fn into_admin(self) -> AdminUser {
        match self {
            Self::Wrapped { admin } | Self::Bare(admin) => admin,
        }
    }
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    /// Credential for REST calls and the push channel.
    pub token: campus_admin_core::Credential,
    /// The admin that signed in.
    pub admin: AdminUser,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_admin_accepts_mongo_id() {
        let admin: AdminUser =
            serde_json::from_value(json!({"_id": "A1", "email": "a@campus.edu", "role": "Moderator"}))
                .unwrap();
        assert_eq!(admin.id, "A1");
        assert_eq!(admin.role, AdminRole::Moderator);
        assert_eq!(admin.name, None);
    }

    #[test]
    fn test_unknown_role() {
        let admin: AdminUser =
            serde_json::from_value(json!({"id": "A2", "email": "b@campus.edu", "role": "Intern"}))
                .unwrap();
        assert_eq!(admin.role, AdminRole::Unknown);
    }

    #[test]
    fn test_me_reply_shapes() {
        let bare: MeReply =
            serde_json::from_value(json!({"id": "A1", "email": "a@campus.edu", "role": "Support"}))
                .unwrap();
        let wrapped: MeReply = serde_json::from_value(
            json!({"admin": {"id": "A1", "email": "a@campus.edu", "role": "Support"}}),
        )
        .unwrap();
        assert_eq!(bare.into_admin(), wrapped.into_admin());
    }
}
