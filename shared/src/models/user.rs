//! User Model

use serde::{Deserialize, Serialize};

/// User entity
///
/// `total_points` is a denormalized projection of the point ledger; it is
/// only ever updated in the same transaction as a new ledger entry and must
/// always equal the sum of the user's `point_history` deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    /// External messaging-platform user id (opaque here; identity
    /// verification is out of scope)
    pub line_user_id: String,
    pub display_name: Option<String>,
    pub picture_url: Option<String>,
    pub total_points: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Upsert user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpsert {
    pub line_user_id: String,
    pub display_name: Option<String>,
    pub picture_url: Option<String>,
}
