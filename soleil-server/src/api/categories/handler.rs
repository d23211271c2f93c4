//! Category API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::db::repository::category;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use shared::models::{Category, CategoryCreate};

/// GET /api/categories - 获取所有分类
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = category::find_all(&state.pool).await?;
    Ok(Json(categories))
}

/// POST /api/categories - 创建分类 (管理)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.slug, "slug", MAX_SHORT_TEXT_LEN)?;

    let category = category::create(&state.pool, payload).await?;
    Ok(Json(category))
}
