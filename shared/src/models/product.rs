//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity (商品)
///
/// `stock` is the authoritative count of unreserved, sellable units. It is
/// only ever mutated by the reservation engine (decrement on create,
/// increment on cancel) and by admin restocking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in yen
    pub price: i64,
    pub image_url: Option<String>,
    pub category_id: i64,
    pub stock: i64,
    /// Per-order reservation cap
    pub max_reserve_qty: i64,
    pub is_new: bool,
    pub is_popular: bool,
    pub is_active: bool,
    /// Comma-separated allergen list (小麦, 乳, 卵, ...)
    pub allergens: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Product with category info (for list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductWithCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub category_id: i64,
    pub category_name: String,
    pub category_slug: String,
    pub stock: i64,
    pub max_reserve_qty: i64,
    pub is_new: bool,
    pub is_popular: bool,
    pub is_active: bool,
    pub allergens: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub category_id: i64,
    pub stock: i64,
    pub max_reserve_qty: Option<i64>,
    pub is_new: Option<bool>,
    pub is_popular: Option<bool>,
    pub allergens: Option<String>,
}

/// Update product payload (admin; `stock` here is the restocking path)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    pub stock: Option<i64>,
    pub max_reserve_qty: Option<i64>,
    pub is_new: Option<bool>,
    pub is_popular: Option<bool>,
    pub is_active: Option<bool>,
    pub allergens: Option<String>,
}
