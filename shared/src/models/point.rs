//! Point Ledger Model

use serde::{Deserialize, Serialize};

/// Ledger entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PointType {
    Earned,
    Used,
    Expired,
    Bonus,
}

impl PointType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earned => "earned",
            Self::Used => "used",
            Self::Expired => "expired",
            Self::Bonus => "bonus",
        }
    }
}

/// Append-only point ledger entry.
///
/// `points` is a signed delta: positive for earned/bonus, negative for
/// used/expired. Entries are never mutated or deleted; a user's balance is
/// the running sum of their entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PointHistory {
    pub id: i64,
    pub user_id: i64,
    pub points: i64,
    #[serde(rename = "type")]
    pub entry_type: PointType,
    pub description: Option<String>,
    pub created_at: i64,
}
