//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`categories`] - 分类接口
//! - [`products`] - 商品接口 (目录 + 管理)
//! - [`reservations`] - 预约接口 (创建 + 状态迁移)
//! - [`coupons`] - 优惠券接口
//! - [`users`] - 用户接口 (资料 + 积分履历)
//! - [`calendar`] - 营业日历接口

pub mod calendar;
pub mod categories;
pub mod coupons;
pub mod health;
pub mod products;
pub mod reservations;
pub mod users;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};
