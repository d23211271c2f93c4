//! Product Repository
//!
//! Plain catalog access. `stock` is never written here except through the
//! admin restock path in [`update`]; reservation-driven decrements and
//! restores live in the reservation engine.

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate, ProductUpdate, ProductWithCategory};
use sqlx::SqlitePool;

pub(crate) const PRODUCT_SELECT: &str = "SELECT id, name, description, price, image_url, category_id, stock, max_reserve_qty, is_new, is_popular, is_active, allergens, created_at, updated_at FROM product";

const PRODUCT_WITH_CATEGORY_SELECT: &str = "SELECT p.id, p.name, p.description, p.price, p.image_url, p.category_id, c.name as category_name, c.slug as category_slug, p.stock, p.max_reserve_qty, p.is_new, p.is_popular, p.is_active, p.allergens, p.created_at, p.updated_at FROM product p JOIN category c ON p.category_id = c.id";

/// Catalog listing filter (`?filter=popular|new`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFilter {
    Popular,
    New,
}

pub async fn find_all(
    pool: &SqlitePool,
    category_slug: Option<&str>,
    filter: Option<CatalogFilter>,
) -> RepoResult<Vec<ProductWithCategory>> {
    let mut sql = format!("{} WHERE p.is_active = 1", PRODUCT_WITH_CATEGORY_SELECT);
    if category_slug.is_some() {
        sql.push_str(" AND c.slug = ?1");
    }
    match filter {
        Some(CatalogFilter::Popular) => sql.push_str(" AND p.is_popular = 1"),
        Some(CatalogFilter::New) => sql.push_str(" AND p.is_new = 1"),
        None => {}
    }
    sql.push_str(" ORDER BY p.created_at DESC");

    let mut query = sqlx::query_as::<_, ProductWithCategory>(&sql);
    if let Some(slug) = category_slug {
        query = query.bind(slug);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("{} WHERE id = ?", PRODUCT_SELECT);
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<ProductWithCategory>> {
    let sql = format!("{} WHERE p.id = ?", PRODUCT_WITH_CATEGORY_SELECT);
    let row = sqlx::query_as::<_, ProductWithCategory>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    if data.price < 0 {
        return Err(RepoError::Validation("price cannot be negative".into()));
    }
    if data.stock < 0 {
        return Err(RepoError::Validation("stock cannot be negative".into()));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO product (id, name, description, price, image_url, category_id, stock, max_reserve_qty, is_new, is_popular, is_active, allergens, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.category_id)
    .bind(data.stock)
    .bind(data.max_reserve_qty.unwrap_or(5))
    .bind(data.is_new.unwrap_or(false))
    .bind(data.is_popular.unwrap_or(false))
    .bind(&data.allergens)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

/// Admin update. Setting `stock` here is the restocking path — the only
/// stock write outside the reservation engine.
pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    if matches!(data.stock, Some(s) if s < 0) {
        return Err(RepoError::Validation("stock cannot be negative".into()));
    }
    if matches!(data.price, Some(p) if p < 0) {
        return Err(RepoError::Validation("price cannot be negative".into()));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE product SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), image_url = COALESCE(?4, image_url), category_id = COALESCE(?5, category_id), stock = COALESCE(?6, stock), max_reserve_qty = COALESCE(?7, max_reserve_qty), is_new = COALESCE(?8, is_new), is_popular = COALESCE(?9, is_popular), is_active = COALESCE(?10, is_active), allergens = COALESCE(?11, allergens), updated_at = ?12 WHERE id = ?13",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(&data.image_url)
    .bind(data.category_id)
    .bind(data.stock)
    .bind(data.max_reserve_qty)
    .bind(data.is_new)
    .bind(data.is_popular)
    .bind(data.is_active)
    .bind(&data.allergens)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Soft delete (catalog hide); stock and history are left intact
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE product SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
