//! Coupon Evaluator
//!
//! Pure functions for coupon eligibility, redeemability and discount
//! computation. Redemption itself (the one-way `is_used` flip) lives in the
//! coupon repository; applying a discount to a reservation total lives in
//! the reservation engine.

use shared::models::{Coupon, DiscountType, UserCoupon};

/// Whether a coupon is inside its eligibility window right now.
///
/// Window is inclusive on both ends: `valid_from ≤ now ≤ valid_until`.
pub fn is_eligible(coupon: &Coupon, now: i64) -> bool {
    coupon.is_active && coupon.valid_from <= now && now <= coupon.valid_until
}

/// Whether a granted coupon instance can still be redeemed
pub fn is_redeemable(user_coupon: &UserCoupon, coupon: &Coupon, now: i64) -> bool {
    is_eligible(coupon, now) && !user_coupon.is_used
}

/// Discount in yen for a reservation total.
///
/// Percentage discounts round down; fixed discounts are capped at the total
/// so the adjusted amount never goes negative.
pub fn discount_amount(coupon: &Coupon, total: i64) -> i64 {
    match coupon.discount_type {
        DiscountType::Percentage => total * coupon.discount_value / 100,
        DiscountType::Fixed => coupon.discount_value.min(total),
    }
}

/// Whether `total` meets the coupon's minimum purchase requirement
pub fn meets_min_purchase(coupon: &Coupon, total: i64) -> bool {
    coupon.min_purchase.is_none_or(|min| total >= min)
}
