//! Business Day Repository

use super::{RepoError, RepoResult};
use shared::models::{BusinessDay, BusinessDayUpsert, RegularHoliday};
use sqlx::SqlitePool;

const BUSINESS_DAY_SELECT: &str = "SELECT id, date, is_open, open_time, close_time, note, created_at, updated_at FROM business_day";

pub async fn find_by_date(pool: &SqlitePool, date: &str) -> RepoResult<Option<BusinessDay>> {
    let sql = format!("{} WHERE date = ?", BUSINESS_DAY_SELECT);
    let row = sqlx::query_as::<_, BusinessDay>(&sql)
        .bind(date)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Overrides inside `[from, to]` (dates compare lexicographically in
/// `YYYY-MM-DD` form)
pub async fn find_in_range(
    pool: &SqlitePool,
    from: &str,
    to: &str,
) -> RepoResult<Vec<BusinessDay>> {
    let sql = format!(
        "{} WHERE date >= ? AND date <= ? ORDER BY date ASC",
        BUSINESS_DAY_SELECT
    );
    let rows = sqlx::query_as::<_, BusinessDay>(&sql)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert or replace the override for a date
pub async fn upsert(pool: &SqlitePool, data: BusinessDayUpsert) -> RepoResult<BusinessDay> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE business_day SET is_open = ?1, open_time = ?2, close_time = ?3, note = ?4, updated_at = ?5 WHERE date = ?6",
    )
    .bind(data.is_open)
    .bind(&data.open_time)
    .bind(&data.close_time)
    .bind(&data.note)
    .bind(now)
    .bind(&data.date)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        let id = shared::util::snowflake_id();
        sqlx::query(
            "INSERT INTO business_day (id, date, is_open, open_time, close_time, note, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(id)
        .bind(&data.date)
        .bind(data.is_open)
        .bind(&data.open_time)
        .bind(&data.close_time)
        .bind(&data.note)
        .bind(now)
        .execute(pool)
        .await?;
    }

    find_by_date(pool, &data.date)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to upsert business day".into()))
}

pub async fn delete_by_date(pool: &SqlitePool, date: &str) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM business_day WHERE date = ?")
        .bind(date)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Regular holidays ────────────────────────────────────────────────

pub async fn find_holiday_weekdays(pool: &SqlitePool) -> RepoResult<Vec<i64>> {
    let rows: Vec<i64> =
        sqlx::query_scalar("SELECT day_of_week FROM regular_holiday ORDER BY day_of_week")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

pub async fn find_holidays(pool: &SqlitePool) -> RepoResult<Vec<RegularHoliday>> {
    let rows = sqlx::query_as::<_, RegularHoliday>(
        "SELECT id, day_of_week, created_at FROM regular_holiday ORDER BY day_of_week",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Replace the weekly closure set
pub async fn replace_holidays(pool: &SqlitePool, weekdays: &[i64]) -> RepoResult<Vec<i64>> {
    if weekdays.iter().any(|d| !(0..=6).contains(d)) {
        return Err(RepoError::Validation(
            "day_of_week must be between 0 and 6".into(),
        ));
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM regular_holiday")
        .execute(&mut *tx)
        .await?;
    for day in weekdays {
        sqlx::query(
            "INSERT OR IGNORE INTO regular_holiday (id, day_of_week, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(shared::util::snowflake_id())
        .bind(*day)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    find_holiday_weekdays(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE business_day (
                id INTEGER PRIMARY KEY,
                date TEXT NOT NULL UNIQUE,
                is_open INTEGER NOT NULL DEFAULT 1,
                open_time TEXT,
                close_time TEXT,
                note TEXT,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE regular_holiday (
                id INTEGER PRIMARY KEY,
                day_of_week INTEGER NOT NULL UNIQUE,
                created_at INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    fn closed(date: &str) -> BusinessDayUpsert {
        BusinessDayUpsert {
            date: date.into(),
            is_open: false,
            open_time: None,
            close_time: None,
            note: Some("臨時休業".into()),
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let pool = test_pool().await;
        let day = upsert(&pool, closed("2026-08-10")).await.unwrap();
        assert!(!day.is_open);

        let mut reopen = closed("2026-08-10");
        reopen.is_open = true;
        reopen.note = Some("臨時営業".into());
        let day = upsert(&pool, reopen).await.unwrap();
        assert!(day.is_open);
        assert_eq!(day.note.as_deref(), Some("臨時営業"));

        // Still a single row for the date
        let all = find_in_range(&pool, "2026-08-01", "2026-08-31").await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_find_in_range_is_inclusive_and_ordered() {
        let pool = test_pool().await;
        upsert(&pool, closed("2026-08-20")).await.unwrap();
        upsert(&pool, closed("2026-08-01")).await.unwrap();
        upsert(&pool, closed("2026-09-01")).await.unwrap();

        let days = find_in_range(&pool, "2026-08-01", "2026-08-31").await.unwrap();
        let dates: Vec<_> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-08-01", "2026-08-20"]);
    }

    #[tokio::test]
    async fn test_replace_holidays() {
        let pool = test_pool().await;
        assert_eq!(replace_holidays(&pool, &[1]).await.unwrap(), vec![1]);
        assert_eq!(replace_holidays(&pool, &[2, 4]).await.unwrap(), vec![2, 4]);
        assert_eq!(replace_holidays(&pool, &[]).await.unwrap(), Vec::<i64>::new());
    }

    #[tokio::test]
    async fn test_replace_holidays_rejects_bad_weekday() {
        let pool = test_pool().await;
        let err = replace_holidays(&pool, &[7]).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
