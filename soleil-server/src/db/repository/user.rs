//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserUpsert};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, line_user_id, display_name, picture_url, total_points, created_at, updated_at FROM user";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{} WHERE id = ?", USER_SELECT);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_line_user_id(pool: &SqlitePool, line_user_id: &str) -> RepoResult<Option<User>> {
    let sql = format!("{} WHERE line_user_id = ?", USER_SELECT);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(line_user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Result of an upsert: the user plus whether this call created them
/// (drives the one-time welcome coupon grant)
pub struct UpsertOutcome {
    pub user: User,
    pub created: bool,
}

/// Upsert by external user id: update profile fields when the user exists,
/// insert a fresh row otherwise.
pub async fn upsert(pool: &SqlitePool, data: UserUpsert) -> RepoResult<UpsertOutcome> {
    let now = shared::util::now_millis();

    if let Some(existing) = find_by_line_user_id(pool, &data.line_user_id).await? {
        sqlx::query(
            "UPDATE user SET display_name = COALESCE(?1, display_name), picture_url = COALESCE(?2, picture_url), updated_at = ?3 WHERE id = ?4",
        )
        .bind(&data.display_name)
        .bind(&data.picture_url)
        .bind(now)
        .bind(existing.id)
        .execute(pool)
        .await?;
        let user = find_by_id(pool, existing.id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to update user".into()))?;
        return Ok(UpsertOutcome {
            user,
            created: false,
        });
    }

    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO user (id, line_user_id, display_name, picture_url, total_points, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
    )
    .bind(id)
    .bind(&data.line_user_id)
    .bind(&data.display_name)
    .bind(&data.picture_url)
    .bind(now)
    .execute(pool)
    .await?;
    let user = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))?;
    Ok(UpsertOutcome {
        user,
        created: true,
    })
}
