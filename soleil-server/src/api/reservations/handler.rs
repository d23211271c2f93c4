//! Reservation API Handlers
//!
//! The create endpoint is the public entry into the reservation engine; the
//! transition endpoints are operator actions driving the lifecycle state
//! machine.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::reservation;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};
use shared::models::{ApplyCouponRequest, ReservationCreate, ReservationDetail};

/// Query params for listing reservations
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

/// GET /api/reservations - 最近の予約 (新しい順)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ReservationDetail>>> {
    let reservations = reservation::find_recent(&state.pool, query.limit).await?;
    Ok(Json(reservations))
}

/// GET /api/reservations/upcoming - 受取日順の予約一覧 (管理)
pub async fn upcoming(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<ReservationDetail>>> {
    let reservations = reservation::find_upcoming(&state.pool).await?;
    Ok(Json(reservations))
}

/// GET /api/reservations/:id - 予約詳細
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetail>> {
    let detail = reservation::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Reservation {id}")))?;
    Ok(Json(detail))
}

/// POST /api/reservations - 予約作成
///
/// 201 on success; 400 names the offending product when stock is short or
/// the shop is closed on the requested date.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<(StatusCode, Json<ReservationDetail>)> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let detail = reservation::create(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// POST /api/reservations/:id/confirm - 確認 (pending → confirmed)
pub async fn confirm(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetail>> {
    let detail = reservation::confirm(&state.pool, id).await?;
    Ok(Json(detail))
}

/// POST /api/reservations/:id/cancel - キャンセル (在庫復元)
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetail>> {
    let detail = reservation::cancel(&state.pool, id).await?;
    Ok(Json(detail))
}

/// POST /api/reservations/:id/complete - 受取完了 (confirmed → completed)
pub async fn complete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetail>> {
    let detail = reservation::complete(&state.pool, id).await?;
    Ok(Json(detail))
}

/// POST /api/reservations/:id/apply-coupon - クーポン適用
pub async fn apply_coupon(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ApplyCouponRequest>,
) -> AppResult<Json<ReservationDetail>> {
    let now = shared::util::now_millis();
    let detail =
        reservation::apply_coupon(&state.pool, id, payload.user_coupon_id, now).await?;
    Ok(Json(detail))
}
