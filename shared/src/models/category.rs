//! Category Model

use serde::{Deserialize, Serialize};

/// Product category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// URL slug used by the catalog filter (`?category=shokupan`)
    pub slug: String,
    pub display_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub slug: String,
    pub display_order: Option<i64>,
}
