//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::product::{self, CatalogFilter};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Product, ProductCreate, ProductUpdate, ProductWithCategory};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Category slug filter
    pub category: Option<String>,
    /// "popular" | "new"
    pub filter: Option<String>,
}

/// GET /api/products - 商品目录 (active のみ)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ProductWithCategory>>> {
    let filter = match query.filter.as_deref() {
        Some("popular") => Some(CatalogFilter::Popular),
        Some("new") => Some(CatalogFilter::New),
        Some(other) => {
            return Err(AppError::validation(format!("unknown filter: {other}")));
        }
        None => None,
    };
    let products = product::find_all(&state.pool, query.category.as_deref(), filter).await?;
    Ok(Json(products))
}

/// GET /api/products/:id - 商品详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductWithCategory>> {
    let product = product::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品 (管理)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;

    let product = product::create(&state.pool, payload).await?;
    Ok(Json(product))
}

/// PUT /api/products/:id - 更新商品 (管理、补货)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;

    let product = product::update(&state.pool, id, payload).await?;
    Ok(Json(product))
}

/// DELETE /api/products/:id - 下架商品 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = product::delete(&state.pool, id).await?;
    Ok(Json(result))
}
