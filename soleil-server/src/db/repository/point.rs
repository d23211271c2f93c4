//! Point Ledger Repository
//!
//! Append-only `point_history` plus the user's denormalized `total_points`.
//! The two writes always happen on the same connection so callers can run
//! them inside a larger transaction (the reservation engine does); the
//! balance projection never diverges from the entry sum.

use super::{RepoError, RepoResult};
use shared::models::{PointHistory, PointType};
use sqlx::{SqliteConnection, SqlitePool};

const POINT_SELECT: &str =
    "SELECT id, user_id, points, entry_type, description, created_at FROM point_history";

/// Append a positive delta and raise the balance.
///
/// `points` must be ≥ 0; use [`debit`] for decreases.
pub async fn credit(
    conn: &mut SqliteConnection,
    user_id: i64,
    points: i64,
    entry_type: PointType,
    description: &str,
) -> RepoResult<PointHistory> {
    if points < 0 {
        return Err(RepoError::Validation("credit points cannot be negative".into()));
    }

    let rows = sqlx::query("UPDATE user SET total_points = total_points + ?1, updated_at = ?2 WHERE id = ?3")
        .bind(points)
        .bind(shared::util::now_millis())
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {user_id} not found")));
    }

    insert_entry(conn, user_id, points, entry_type, description).await
}

/// Append a negative delta and lower the balance.
///
/// Rejected when it would drive the balance below zero; the conditional
/// UPDATE makes check and decrement one atomic statement.
pub async fn debit(
    conn: &mut SqliteConnection,
    user_id: i64,
    points: i64,
    entry_type: PointType,
    description: &str,
) -> RepoResult<PointHistory> {
    if points < 0 {
        return Err(RepoError::Validation("debit points cannot be negative".into()));
    }

    let rows = sqlx::query(
        "UPDATE user SET total_points = total_points - ?1, updated_at = ?2 WHERE id = ?3 AND total_points >= ?1",
    )
    .bind(points)
    .bind(shared::util::now_millis())
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        // Distinguish missing user from insufficient balance
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM user WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;
        return match exists {
            None => Err(RepoError::NotFound(format!("User {user_id} not found"))),
            Some(_) => Err(RepoError::Unavailable("insufficient point balance".into())),
        };
    }

    insert_entry(conn, user_id, -points, entry_type, description).await
}

async fn insert_entry(
    conn: &mut SqliteConnection,
    user_id: i64,
    points: i64,
    entry_type: PointType,
    description: &str,
) -> RepoResult<PointHistory> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO point_history (id, user_id, points, entry_type, description, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(id)
    .bind(user_id)
    .bind(points)
    .bind(entry_type.as_str())
    .bind(description)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let sql = format!("{} WHERE id = ?", POINT_SELECT);
    let entry = sqlx::query_as::<_, PointHistory>(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(entry)
}

/// Recent ledger entries for a user, newest first
pub async fn history(pool: &SqlitePool, user_id: i64, limit: i64) -> RepoResult<Vec<PointHistory>> {
    let sql = format!(
        "{} WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        POINT_SELECT
    );
    let rows = sqlx::query_as::<_, PointHistory>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Balance derived from the ledger (the denormalized counter must always
/// equal this sum)
pub async fn derived_balance(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let sum: Option<i64> =
        sqlx::query_scalar("SELECT SUM(points) FROM point_history WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(sum.unwrap_or(0))
}
