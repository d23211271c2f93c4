//! Coupon Repository

use super::{RepoError, RepoResult};
use shared::models::{Coupon, CouponCreate, UserCoupon, UserCouponWithCoupon};
use sqlx::SqlitePool;

const COUPON_SELECT: &str = "SELECT id, code, name, description, discount_type, discount_value, min_purchase, valid_from, valid_until, conditions, is_active, created_at FROM coupon";

const USER_COUPON_SELECT: &str =
    "SELECT id, user_id, coupon_id, is_used, used_at, created_at FROM user_coupon";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Coupon>> {
    let sql = format!("{} WHERE id = ?", COUPON_SELECT);
    let row = sqlx::query_as::<_, Coupon>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Coupons currently inside their eligibility window, soonest expiry first
pub async fn find_eligible(pool: &SqlitePool, now: i64) -> RepoResult<Vec<Coupon>> {
    let sql = format!(
        "{} WHERE is_active = 1 AND valid_from <= ?1 AND valid_until >= ?1 ORDER BY valid_until ASC",
        COUPON_SELECT
    );
    let rows = sqlx::query_as::<_, Coupon>(&sql)
        .bind(now)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// The active first-visit coupon granted to newly registered users
pub async fn find_first_visit_active(pool: &SqlitePool) -> RepoResult<Option<Coupon>> {
    let sql = format!(
        "{} WHERE conditions = 'first_visit' AND is_active = 1 ORDER BY created_at ASC LIMIT 1",
        COUPON_SELECT
    );
    let row = sqlx::query_as::<_, Coupon>(&sql).fetch_optional(pool).await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: CouponCreate) -> RepoResult<Coupon> {
    if data.valid_until < data.valid_from {
        return Err(RepoError::Validation(
            "valid_until must not precede valid_from".into(),
        ));
    }
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO coupon (id, code, name, description, discount_type, discount_value, min_purchase, valid_from, valid_until, conditions, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11)",
    )
    .bind(id)
    .bind(&data.code)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.discount_type)
    .bind(data.discount_value)
    .bind(data.min_purchase)
    .bind(data.valid_from)
    .bind(data.valid_until)
    .bind(&data.conditions)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create coupon".into()))
}

// ── User coupons ────────────────────────────────────────────────────

pub async fn find_user_coupon(pool: &SqlitePool, id: i64) -> RepoResult<Option<UserCoupon>> {
    let sql = format!("{} WHERE id = ?", USER_COUPON_SELECT);
    let row = sqlx::query_as::<_, UserCoupon>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Grant a coupon instance to a user
pub async fn grant(pool: &SqlitePool, user_id: i64, coupon_id: i64) -> RepoResult<UserCoupon> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO user_coupon (id, user_id, coupon_id, is_used, created_at) VALUES (?1, ?2, ?3, 0, ?4)",
    )
    .bind(id)
    .bind(user_id)
    .bind(coupon_id)
    .bind(now)
    .execute(pool)
    .await?;
    find_user_coupon(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to grant coupon".into()))
}

/// A user's unused coupons whose window has not yet closed
pub async fn find_unused_for_user(
    pool: &SqlitePool,
    user_id: i64,
    now: i64,
) -> RepoResult<Vec<UserCouponWithCoupon>> {
    let rows = sqlx::query_as::<_, UserCouponWithCoupon>(
        "SELECT uc.id, uc.user_id, uc.coupon_id, uc.is_used, uc.used_at, c.code, c.name, c.description, c.discount_type, c.discount_value, c.min_purchase, c.valid_from, c.valid_until, c.conditions FROM user_coupon uc JOIN coupon c ON uc.coupon_id = c.id WHERE uc.user_id = ?1 AND uc.is_used = 0 AND c.valid_until >= ?2 ORDER BY c.valid_until ASC",
    )
    .bind(user_id)
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// One-way redemption: flips `is_used` exactly once.
///
/// The `is_used = 0` guard makes the check and the flip one atomic
/// statement; a second call is a conflict, never a double redemption.
pub async fn redeem(pool: &SqlitePool, user_coupon_id: i64, now: i64) -> RepoResult<UserCoupon> {
    let rows = sqlx::query("UPDATE user_coupon SET is_used = 1, used_at = ?1 WHERE id = ?2 AND is_used = 0")
        .bind(now)
        .bind(user_coupon_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return match find_user_coupon(pool, user_coupon_id).await? {
            None => Err(RepoError::NotFound(format!(
                "UserCoupon {user_coupon_id} not found"
            ))),
            Some(_) => Err(RepoError::Conflict("coupon already used".into())),
        };
    }
    find_user_coupon(pool, user_coupon_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to redeem coupon".into()))
}
