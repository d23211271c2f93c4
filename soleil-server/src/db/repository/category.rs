//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate};
use sqlx::SqlitePool;

const CATEGORY_SELECT: &str =
    "SELECT id, name, slug, display_order, created_at, updated_at FROM category";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let sql = format!("{} ORDER BY display_order", CATEGORY_SELECT);
    let rows = sqlx::query_as::<_, Category>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let sql = format!("{} WHERE id = ?", CATEGORY_SELECT);
    let row = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> RepoResult<Option<Category>> {
    let sql = format!("{} WHERE slug = ?", CATEGORY_SELECT);
    let row = sqlx::query_as::<_, Category>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO category (id, name, slug, display_order, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.slug)
    .bind(data.display_order.unwrap_or(0))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}
