//! Marketing logic (coupons)

pub mod coupon;

pub use coupon::{discount_amount, is_eligible, is_redeemable};
