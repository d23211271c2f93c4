//! User API Handlers
//!
//! Thin data-access path under the external identity layer: profile upsert
//! (with the one-time welcome coupon grant) and the mypage view of unused
//! coupons plus recent point history. Verifying the external identity is out
//! of scope here.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::{coupon, point, user};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{PointHistory, User, UserCouponWithCoupon, UserUpsert};

const POINT_HISTORY_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub line_user_id: String,
}

/// User profile response (user + unused coupons + recent point history)
#[derive(Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub coupons: Vec<UserCouponWithCoupon>,
    pub point_history: Vec<PointHistory>,
}

/// GET /api/users?line_user_id=xxx - 用户资料
pub async fn get_profile(
    State(state): State<ServerState>,
    Query(query): Query<ProfileQuery>,
) -> AppResult<Json<UserProfile>> {
    let user = user::find_by_line_user_id(&state.pool, &query.line_user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let now = shared::util::now_millis();
    let coupons = coupon::find_unused_for_user(&state.pool, user.id, now).await?;
    let point_history = point::history(&state.pool, user.id, POINT_HISTORY_LIMIT).await?;

    Ok(Json(UserProfile {
        user,
        coupons,
        point_history,
    }))
}

/// POST /api/users - 用户 upsert
///
/// 初回登録時は first_visit クーポンを自動付与
pub async fn upsert(
    State(state): State<ServerState>,
    Json(payload): Json<UserUpsert>,
) -> AppResult<Json<User>> {
    validate_required_text(&payload.line_user_id, "line_user_id", MAX_SHORT_TEXT_LEN)?;

    let outcome = user::upsert(&state.pool, payload).await?;

    if outcome.created
        && let Some(welcome) = coupon::find_first_visit_active(&state.pool).await?
    {
        coupon::grant(&state.pool, outcome.user.id, welcome.id).await?;
        tracing::info!(user_id = outcome.user.id, coupon_id = welcome.id, "Welcome coupon granted");
    }

    Ok(Json(outcome.user))
}
