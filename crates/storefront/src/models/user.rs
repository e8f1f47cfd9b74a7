//! User model for session authentication.

use chrono::{DateTime, Utc};
use serde::Serialize;

use homegrid_core::{UserId, UserRole};

/// A registered shopper or administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Argon2 hash; never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}
