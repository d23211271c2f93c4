//! Coupon Model

use serde::{Deserialize, Serialize};

/// Discount type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum DiscountType {
    /// Percentage of the total (value 10 = 10% off)
    Percentage,
    /// Fixed amount in yen
    Fixed,
}

/// Coupon entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    /// Minimum reservation total (yen) required to redeem
    pub min_purchase: Option<i64>,
    /// Eligibility window, inclusive on both ends (Unix millis)
    pub valid_from: i64,
    pub valid_until: i64,
    /// Optional condition tag ("rain", "first_visit", ...); null = unconditional
    pub conditions: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create coupon payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCreate {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_purchase: Option<i64>,
    pub valid_from: i64,
    pub valid_until: i64,
    pub conditions: Option<String>,
}

/// A coupon instance granted to a user.
///
/// Becomes permanently unusable once `is_used` is set; there is no un-use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserCoupon {
    pub id: i64,
    pub user_id: i64,
    pub coupon_id: i64,
    pub is_used: bool,
    pub used_at: Option<i64>,
    pub created_at: i64,
}

/// User coupon joined with its coupon definition (for mypage views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserCouponWithCoupon {
    pub id: i64,
    pub user_id: i64,
    pub coupon_id: i64,
    pub is_used: bool,
    pub used_at: Option<i64>,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_purchase: Option<i64>,
    pub valid_from: i64,
    pub valid_until: i64,
    pub conditions: Option<String>,
}
