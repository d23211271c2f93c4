//! Data models
//!
//! Shared between soleil-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are snowflake `i64`, all timestamps Unix millis, all money
//! integer yen.

pub mod business_day;
pub mod category;
pub mod coupon;
pub mod point;
pub mod product;
pub mod reservation;
pub mod user;

// Re-exports
pub use business_day::*;
pub use category::*;
pub use coupon::*;
pub use point::*;
pub use product::*;
pub use reservation::*;
pub use user::*;
