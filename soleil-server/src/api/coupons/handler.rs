//! Coupon API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::coupon;
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{Coupon, CouponCreate, UserCoupon};

/// GET /api/coupons - 現在有効なクーポン (期限が近い順)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Coupon>>> {
    let now = shared::util::now_millis();
    let coupons = coupon::find_eligible(&state.pool, now).await?;
    Ok(Json(coupons))
}

/// POST /api/coupons - クーポン作成 (管理)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CouponCreate>,
) -> AppResult<Json<Coupon>> {
    validate_required_text(&payload.code, "code", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    if payload.discount_value < 0 {
        return Err(AppError::validation("discount_value cannot be negative"));
    }

    let coupon = coupon::create(&state.pool, payload).await?;
    Ok(Json(coupon))
}

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub user_id: i64,
}

/// POST /api/coupons/:id/grant - ユーザーへ付与 (管理)
pub async fn grant(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<GrantRequest>,
) -> AppResult<Json<UserCoupon>> {
    if coupon::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found(format!("Coupon {id}")));
    }
    let user_coupon = coupon::grant(&state.pool, payload.user_id, id).await?;
    Ok(Json(user_coupon))
}
