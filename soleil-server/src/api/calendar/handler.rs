//! Calendar API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{self, DayStatus};
use crate::core::ServerState;
use crate::db::repository::business_day;
use crate::utils::{AppError, AppResult};
use shared::models::{BusinessDay, BusinessDayUpsert, RegularHolidayUpdate};

const DEFAULT_RANGE_DAYS: i64 = 90;
const MAX_RANGE_DAYS: i64 = 366;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// Forward range in days from today (default 90)
    pub days: Option<i64>,
}

/// Override records + the weekly closure rule for a bounded forward range
#[derive(Serialize)]
pub struct CalendarResponse {
    pub business_days: Vec<BusinessDay>,
    /// 0 = Sunday .. 6 = Saturday
    pub regular_holidays: Vec<i64>,
}

/// GET /api/calendar?days=N - 営業日カレンダー (公開)
pub async fn get_calendar(
    State(state): State<ServerState>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<CalendarResponse>> {
    let days = query.days.unwrap_or(DEFAULT_RANGE_DAYS).clamp(1, MAX_RANGE_DAYS);

    let today = chrono::Utc::now().date_naive();
    let from = today.format("%Y-%m-%d").to_string();
    let to = (today + Duration::days(days)).format("%Y-%m-%d").to_string();

    let business_days = business_day::find_in_range(&state.pool, &from, &to).await?;
    let regular_holidays = business_day::find_holiday_weekdays(&state.pool).await?;

    Ok(Json(CalendarResponse {
        business_days,
        regular_holidays,
    }))
}

/// GET /api/calendar/resolve/:date - 单日解析 (override → 定休日 → 默认营业)
pub async fn resolve_date(
    State(state): State<ServerState>,
    Path(date): Path<String>,
) -> AppResult<Json<DayStatus>> {
    let parsed = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("invalid date: {date}")))?;

    let overrides = match business_day::find_by_date(&state.pool, &date).await? {
        Some(day) => vec![day],
        None => vec![],
    };
    let holidays = business_day::find_holiday_weekdays(&state.pool).await?;

    Ok(Json(calendar::resolve(parsed, &overrides, &holidays)))
}

/// PUT /api/calendar/days - 覆盖日 upsert (管理)
pub async fn upsert_day(
    State(state): State<ServerState>,
    Json(payload): Json<BusinessDayUpsert>,
) -> AppResult<Json<BusinessDay>> {
    NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("invalid date: {}", payload.date)))?;

    let day = business_day::upsert(&state.pool, payload).await?;
    Ok(Json(day))
}

/// PUT /api/calendar/holidays - 定休日セット置換 (管理)
pub async fn replace_holidays(
    State(state): State<ServerState>,
    Json(payload): Json<RegularHolidayUpdate>,
) -> AppResult<Json<Vec<i64>>> {
    let weekdays = business_day::replace_holidays(&state.pool, &payload.weekdays).await?;
    Ok(Json(weekdays))
}
