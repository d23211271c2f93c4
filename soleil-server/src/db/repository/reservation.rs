//! Reservation Engine
//!
//! The transactional core: validates a pickup order against the calendar and
//! live stock, then commits header + line snapshots + stock decrements + the
//! point credit as one unit. Stock checks are conditional UPDATEs
//! (`... AND stock >= ?`), so check and decrement are a single atomic
//! statement per line — two concurrent reservations can never jointly
//! oversell a product, and a rejected create leaves zero persisted state.
//!
//! Lifecycle transitions are source-state-guarded UPDATEs; a wrong source
//! state is a conflict with no effect.

use super::{RepoError, RepoResult, point};
use crate::calendar;
use crate::marketing;
use chrono::NaiveDate;
use shared::models::{
    PickupTimeSlot, PointType, Product, Reservation, ReservationCreate, ReservationDetail,
    ReservationItem, ReservationStatus,
};
use sqlx::SqlitePool;

const RESERVATION_SELECT: &str = "SELECT id, user_id, pickup_date, pickup_time_slot, status, total_amount, points_earned, note, created_at, updated_at FROM reservation";

const ITEM_SELECT: &str = "SELECT id, reservation_id, product_id, product_name, quantity, price FROM reservation_item";

// ── Queries ─────────────────────────────────────────────────────────

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ReservationDetail>> {
    let sql = format!("{} WHERE id = ?", RESERVATION_SELECT);
    let Some(reservation) = sqlx::query_as::<_, Reservation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };
    let items = find_items(pool, id).await?;
    Ok(Some(ReservationDetail { reservation, items }))
}

async fn find_items(pool: &SqlitePool, reservation_id: i64) -> RepoResult<Vec<ReservationItem>> {
    let sql = format!("{} WHERE reservation_id = ? ORDER BY id", ITEM_SELECT);
    let items = sqlx::query_as::<_, ReservationItem>(&sql)
        .bind(reservation_id)
        .fetch_all(pool)
        .await?;
    Ok(items)
}

/// Recent reservations, newest first
pub async fn find_recent(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<ReservationDetail>> {
    let sql = format!("{} ORDER BY created_at DESC LIMIT ?", RESERVATION_SELECT);
    let headers = sqlx::query_as::<_, Reservation>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    with_items(pool, headers).await
}

/// Admin view: reservations by pickup date, earliest first
pub async fn find_upcoming(pool: &SqlitePool) -> RepoResult<Vec<ReservationDetail>> {
    let sql = format!(
        "{} ORDER BY pickup_date ASC, pickup_time_slot ASC, created_at ASC",
        RESERVATION_SELECT
    );
    let headers = sqlx::query_as::<_, Reservation>(&sql).fetch_all(pool).await?;
    with_items(pool, headers).await
}

async fn with_items(
    pool: &SqlitePool,
    headers: Vec<Reservation>,
) -> RepoResult<Vec<ReservationDetail>> {
    let mut details = Vec::with_capacity(headers.len());
    for reservation in headers {
        let items = find_items(pool, reservation.id).await?;
        details.push(ReservationDetail { reservation, items });
    }
    Ok(details)
}

// ── Create ──────────────────────────────────────────────────────────

/// Create a reservation.
///
/// Preconditions, each with its own failure:
/// 1. non-empty items, every quantity ≥ 1
/// 2. pickup date resolves open on the calendar
/// 3. pickup slot is one of the fixed hourly slots
/// 4. every product exists, is active and has sufficient live stock
///
/// The caller-declared prices and total are ignored; line snapshots and the
/// total come from the products table at commit time. All effects commit
/// atomically — any failed line rolls back every decrement and no
/// reservation, item or ledger row survives.
pub async fn create(pool: &SqlitePool, data: ReservationCreate) -> RepoResult<ReservationDetail> {
    if data.items.is_empty() {
        return Err(RepoError::Validation("items must not be empty".into()));
    }
    if data.items.iter().any(|i| i.quantity < 1) {
        return Err(RepoError::Validation("quantity must be at least 1".into()));
    }

    let pickup_date = NaiveDate::parse_from_str(&data.pickup_date, "%Y-%m-%d")
        .map_err(|_| RepoError::Validation(format!("invalid pickup date: {}", data.pickup_date)))?;

    let slot = PickupTimeSlot::parse(&data.pickup_time_slot).ok_or_else(|| {
        RepoError::Validation(format!(
            "invalid pickup time slot: {}",
            data.pickup_time_slot
        ))
    })?;

    // Calendar check: per-date override beats the weekly closure rule
    let overrides = match super::business_day::find_by_date(pool, &data.pickup_date).await? {
        Some(day) => vec![day],
        None => vec![],
    };
    let holidays = super::business_day::find_holiday_weekdays(pool).await?;
    let status = calendar::resolve(pickup_date, &overrides, &holidays);
    if !status.is_open {
        return Err(RepoError::Unavailable(format!(
            "shop is closed on {}",
            data.pickup_date
        )));
    }

    if super::user::find_by_id(pool, data.user_id).await?.is_none() {
        return Err(RepoError::NotFound(format!("User {} not found", data.user_id)));
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    // Decrement first: the conditional UPDATE is both the existence/stock
    // check and the reservation of the units. Any failing line aborts the
    // whole transaction.
    let product_sql = format!("{} WHERE id = ?", super::product::PRODUCT_SELECT);
    let mut lines: Vec<(Product, i64)> = Vec::with_capacity(data.items.len());
    let mut total_amount: i64 = 0;
    for item in &data.items {
        let rows = sqlx::query(
            "UPDATE product SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND is_active = 1 AND stock >= ?1",
        )
        .bind(item.quantity)
        .bind(now)
        .bind(item.product_id)
        .execute(&mut *tx)
        .await?;

        if rows.rows_affected() == 0 {
            let product: Option<Product> = sqlx::query_as(&product_sql)
                .bind(item.product_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match product {
                Some(p) if p.is_active => {
                    RepoError::Unavailable(format!("insufficient stock for {}", p.name))
                }
                _ => RepoError::NotFound(format!("Product {} not found", item.product_id)),
            });
        }

        let product: Product = sqlx::query_as(&product_sql)
            .bind(item.product_id)
            .fetch_one(&mut *tx)
            .await?;
        total_amount += product.price * item.quantity;
        lines.push((product, item.quantity));
    }

    // 1 point per 100 yen
    let points_earned = total_amount / 100;

    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO reservation (id, user_id, pickup_date, pickup_time_slot, status, total_amount, points_earned, note, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(data.user_id)
    .bind(&data.pickup_date)
    .bind(slot)
    .bind(total_amount)
    .bind(points_earned)
    .bind(&data.note)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for (product, quantity) in &lines {
        sqlx::query(
            "INSERT INTO reservation_item (id, reservation_id, product_id, product_name, quantity, price, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(shared::util::snowflake_id())
        .bind(id)
        .bind(product.id)
        .bind(&product.name)
        .bind(*quantity)
        .bind(product.price)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    if points_earned > 0 {
        point::credit(
            &mut *tx,
            data.user_id,
            points_earned,
            PointType::Earned,
            &format!("取り置き予約 #{id}"),
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        reservation_id = id,
        user_id = data.user_id,
        total_amount,
        points_earned,
        "Reservation created"
    );

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create reservation".into()))
}

// ── Lifecycle transitions ───────────────────────────────────────────

/// `pending → confirmed`; no side effects beyond the state change
pub async fn confirm(pool: &SqlitePool, id: i64) -> RepoResult<ReservationDetail> {
    let rows = sqlx::query(
        "UPDATE reservation SET status = 'confirmed', updated_at = ?1 WHERE id = ?2 AND status = 'pending'",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(transition_conflict(pool, id, "confirm").await?);
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reservation {id} not found")))
}

/// `confirmed → completed`; pickup fulfilled, no stock or ledger effect
pub async fn complete(pool: &SqlitePool, id: i64) -> RepoResult<ReservationDetail> {
    let rows = sqlx::query(
        "UPDATE reservation SET status = 'completed', updated_at = ?1 WHERE id = ?2 AND status = 'confirmed'",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(transition_conflict(pool, id, "complete").await?);
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reservation {id} not found")))
}

/// `{pending, confirmed} → cancelled`.
///
/// Restores every line's stock (the inverse of the commit-time decrement)
/// and reverses the points earned at creation — clamped to the current
/// balance so a user who already spent them is never driven negative — all
/// in one transaction.
pub async fn cancel(pool: &SqlitePool, id: i64) -> RepoResult<ReservationDetail> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE reservation SET status = 'cancelled', updated_at = ?1 WHERE id = ?2 AND status IN ('pending', 'confirmed')",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        drop(tx);
        return Err(transition_conflict(pool, id, "cancel").await?);
    }

    let header_sql = format!("{} WHERE id = ?", RESERVATION_SELECT);
    let header: Reservation = sqlx::query_as(&header_sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    let items_sql = format!("{} WHERE reservation_id = ?", ITEM_SELECT);
    let items: Vec<ReservationItem> = sqlx::query_as(&items_sql)
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

    for item in &items {
        sqlx::query("UPDATE product SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3")
            .bind(item.quantity)
            .bind(now)
            .bind(item.product_id)
            .execute(&mut *tx)
            .await?;
    }

    if header.points_earned > 0 {
        let balance: i64 = sqlx::query_scalar("SELECT total_points FROM user WHERE id = ?")
            .bind(header.user_id)
            .fetch_one(&mut *tx)
            .await?;
        let reversal = header.points_earned.min(balance);
        if reversal > 0 {
            point::debit(
                &mut *tx,
                header.user_id,
                reversal,
                PointType::Expired,
                &format!("取り置き予約キャンセル #{id}"),
            )
            .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(reservation_id = id, "Reservation cancelled, stock restored");

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reservation {id} not found")))
}

/// Build the error for a transition whose guarded UPDATE matched nothing:
/// either the reservation doesn't exist, or it was in a wrong source state.
async fn transition_conflict(pool: &SqlitePool, id: i64, action: &str) -> RepoResult<RepoError> {
    let sql = format!("{} WHERE id = ?", RESERVATION_SELECT);
    let existing = sqlx::query_as::<_, Reservation>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(match existing {
        None => RepoError::NotFound(format!("Reservation {id} not found")),
        Some(r) => RepoError::Conflict(format!(
            "cannot {} reservation in status {}",
            action,
            r.status.as_str()
        )),
    })
}

// ── Coupon application ──────────────────────────────────────────────

/// Apply a granted coupon to a pending reservation.
///
/// Validates redeemability (window + unused) and the coupon's minimum
/// purchase against the reservation total, then adjusts the total and marks
/// the coupon used in one transaction. Points earned at creation are not
/// recomputed.
pub async fn apply_coupon(
    pool: &SqlitePool,
    reservation_id: i64,
    user_coupon_id: i64,
    now: i64,
) -> RepoResult<ReservationDetail> {
    let mut tx = pool.begin().await?;

    let header_sql = format!("{} WHERE id = ?", RESERVATION_SELECT);
    let header: Reservation = sqlx::query_as(&header_sql)
        .bind(reservation_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reservation {reservation_id} not found")))?;

    if header.status != ReservationStatus::Pending {
        return Err(RepoError::Conflict(format!(
            "coupon can only be applied to a pending reservation (status {})",
            header.status.as_str()
        )));
    }

    let user_coupon: shared::models::UserCoupon = sqlx::query_as(
        "SELECT id, user_id, coupon_id, is_used, used_at, created_at FROM user_coupon WHERE id = ?",
    )
    .bind(user_coupon_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("UserCoupon {user_coupon_id} not found")))?;

    if user_coupon.user_id != header.user_id {
        return Err(RepoError::Validation(
            "coupon does not belong to the reservation owner".into(),
        ));
    }

    let coupon: shared::models::Coupon = sqlx::query_as(
        "SELECT id, code, name, description, discount_type, discount_value, min_purchase, valid_from, valid_until, conditions, is_active, created_at FROM coupon WHERE id = ?",
    )
    .bind(user_coupon.coupon_id)
    .fetch_one(&mut *tx)
    .await?;

    if user_coupon.is_used {
        return Err(RepoError::Conflict("coupon already used".into()));
    }
    if !marketing::is_eligible(&coupon, now) {
        return Err(RepoError::Unavailable(format!(
            "coupon {} is not currently redeemable",
            coupon.code
        )));
    }
    if !marketing::coupon::meets_min_purchase(&coupon, header.total_amount) {
        return Err(RepoError::Unavailable(format!(
            "minimum purchase of {} yen not met",
            coupon.min_purchase.unwrap_or(0)
        )));
    }

    let discount = marketing::discount_amount(&coupon, header.total_amount);

    sqlx::query(
        "UPDATE reservation SET total_amount = total_amount - ?1, updated_at = ?2 WHERE id = ?3 AND status = 'pending'",
    )
    .bind(discount)
    .bind(now)
    .bind(reservation_id)
    .execute(&mut *tx)
    .await?;

    // One-way flip; losing a race to another redemption aborts everything
    let rows = sqlx::query("UPDATE user_coupon SET is_used = 1, used_at = ?1 WHERE id = ?2 AND is_used = 0")
        .bind(now)
        .bind(user_coupon_id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict("coupon already used".into()));
    }

    tx.commit().await?;

    tracing::info!(
        reservation_id,
        user_coupon_id,
        discount,
        coupon_code = %coupon.code,
        "Coupon applied"
    );

    find_by_id(pool, reservation_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to apply coupon".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ReservationItemInput, UserCoupon};
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory SQLite pool with the full reservation schema.
    /// Single connection: every acquire sees the same database.
    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        for ddl in [
            "CREATE TABLE category (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                display_order INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE product (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                price INTEGER NOT NULL,
                image_url TEXT,
                category_id INTEGER NOT NULL,
                stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
                max_reserve_qty INTEGER NOT NULL DEFAULT 5,
                is_new INTEGER NOT NULL DEFAULT 0,
                is_popular INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                allergens TEXT,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE user (
                id INTEGER PRIMARY KEY,
                line_user_id TEXT NOT NULL UNIQUE,
                display_name TEXT,
                picture_url TEXT,
                total_points INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE reservation (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                pickup_date TEXT NOT NULL,
                pickup_time_slot TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                total_amount INTEGER NOT NULL DEFAULT 0,
                points_earned INTEGER NOT NULL DEFAULT 0,
                note TEXT,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE reservation_item (
                id INTEGER PRIMARY KEY,
                reservation_id INTEGER NOT NULL,
                product_id INTEGER NOT NULL,
                product_name TEXT NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 1),
                price INTEGER NOT NULL,
                created_at INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE point_history (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                points INTEGER NOT NULL,
                entry_type TEXT NOT NULL,
                description TEXT,
                created_at INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE coupon (
                id INTEGER PRIMARY KEY,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                description TEXT,
                discount_type TEXT NOT NULL,
                discount_value INTEGER NOT NULL,
                min_purchase INTEGER,
                valid_from INTEGER NOT NULL,
                valid_until INTEGER NOT NULL,
                conditions TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL DEFAULT 0
            )",
            "CREATE TABLE user_coupon (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                coupon_id INTEGER NOT NULL,
                is_used INTEGER NOT NULL DEFAULT 0,
                used_at INTEGER,
                created_at INTEGER NOT NULL DEFAULT 0
            )",
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
            "CREATE TABLE regular_holiday (
                id INTEGER PRIMARY KEY,
                day_of_week INTEGER NOT NULL UNIQUE,
                created_at INTEGER NOT NULL DEFAULT 0
            )",
        ] {
            sqlx::query(ddl).execute(&pool).await.unwrap();
        }

        // Seed: category + products + demo user + Monday closure
        sqlx::query("INSERT INTO category (id, name, slug, display_order) VALUES (1, '食パン', 'shokupan', 1)")
            .execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO product (id, name, price, category_id, stock, max_reserve_qty) VALUES (1, '極上生食パン', 800, 1, 10, 3)")
            .execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO product (id, name, price, category_id, stock, max_reserve_qty) VALUES (2, 'クリームパン', 200, 1, 15, 5)")
            .execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO product (id, name, price, category_id, stock, max_reserve_qty) VALUES (3, '明太フランス', 350, 1, 4, 3)")
            .execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO product (id, name, price, category_id, stock, max_reserve_qty, is_active) VALUES (4, '旧商品', 500, 1, 9, 3, 0)")
            .execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO user (id, line_user_id, display_name) VALUES (1, 'demo-user', 'デモユーザー')")
            .execute(&pool).await.unwrap();
        sqlx::query("INSERT INTO regular_holiday (id, day_of_week) VALUES (1, 1)")
            .execute(&pool).await.unwrap();

        pool
    }

    // 2026-08-12 is a Wednesday; 2026-08-10 a Monday (regular holiday)
    const OPEN_DATE: &str = "2026-08-12";
    const HOLIDAY_DATE: &str = "2026-08-10";

    fn request(items: Vec<ReservationItemInput>) -> ReservationCreate {
        ReservationCreate {
            user_id: 1,
            pickup_date: OPEN_DATE.to_string(),
            pickup_time_slot: "10:00-11:00".to_string(),
            note: None,
            items,
            total_amount: None,
        }
    }

    fn item(product_id: i64, quantity: i64) -> ReservationItemInput {
        ReservationItemInput {
            product_id,
            quantity,
            price: None,
        }
    }

    async fn stock_of(pool: &SqlitePool, product_id: i64) -> i64 {
        sqlx::query_scalar("SELECT stock FROM product WHERE id = ?")
            .bind(product_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn balance_of(pool: &SqlitePool, user_id: i64) -> i64 {
        sqlx::query_scalar("SELECT total_points FROM user WHERE id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn reservation_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM reservation")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    // ========== Create ==========

    #[tokio::test]
    async fn test_create_decrements_stock_and_credits_points() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(1, 2), item(2, 1)]))
            .await
            .unwrap();

        assert_eq!(detail.reservation.status, ReservationStatus::Pending);
        // 2 × 800 + 1 × 200 = 1800, 18 points
        assert_eq!(detail.reservation.total_amount, 1800);
        assert_eq!(detail.reservation.points_earned, 18);
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].price, 800);
        assert_eq!(detail.items[0].product_name, "極上生食パン");

        assert_eq!(stock_of(&pool, 1).await, 8);
        assert_eq!(stock_of(&pool, 2).await, 14);
        assert_eq!(balance_of(&pool, 1).await, 18);
        assert_eq!(point::derived_balance(&pool, 1).await.unwrap(), 18);
    }

    #[tokio::test]
    async fn test_create_ignores_caller_prices_and_total() {
        let pool = test_pool().await;
        let mut req = request(vec![ReservationItemInput {
            product_id: 1,
            quantity: 1,
            price: Some(1), // untrusted
        }]);
        req.total_amount = Some(1); // untrusted
        let detail = create(&pool, req).await.unwrap();

        assert_eq!(detail.reservation.total_amount, 800);
        assert_eq!(detail.items[0].price, 800);
    }

    #[tokio::test]
    async fn test_create_empty_items_fails_validation_no_row() {
        let pool = test_pool().await;
        let err = create(&pool, request(vec![])).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(reservation_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_create_zero_quantity_fails_validation() {
        let pool = test_pool().await;
        let err = create(&pool, request(vec![item(1, 0)])).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(stock_of(&pool, 1).await, 10);
    }

    #[tokio::test]
    async fn test_create_invalid_slot_fails_validation() {
        let pool = test_pool().await;
        let mut req = request(vec![item(1, 1)]);
        req.pickup_time_slot = "18:00-19:00".to_string();
        let err = create(&pool, req).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert_eq!(reservation_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_create_on_regular_holiday_rejected() {
        let pool = test_pool().await;
        let mut req = request(vec![item(1, 1)]);
        req.pickup_date = HOLIDAY_DATE.to_string();
        let err = create(&pool, req).await.unwrap_err();
        assert!(matches!(err, RepoError::Unavailable(_)));
        assert_eq!(stock_of(&pool, 1).await, 10);
    }

    #[tokio::test]
    async fn test_create_on_overridden_holiday_succeeds() {
        let pool = test_pool().await;
        // Monday, but the shop opened it explicitly
        sqlx::query("INSERT INTO business_day (id, date, is_open, note) VALUES (1, ?, 1, '臨時営業')")
            .bind(HOLIDAY_DATE)
            .execute(&pool)
            .await
            .unwrap();
        let mut req = request(vec![item(1, 1)]);
        req.pickup_date = HOLIDAY_DATE.to_string();
        assert!(create(&pool, req).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_on_closed_override_rejected() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO business_day (id, date, is_open, note) VALUES (1, ?, 0, '臨時休業')")
            .bind(OPEN_DATE)
            .execute(&pool)
            .await
            .unwrap();
        let err = create(&pool, request(vec![item(1, 1)])).await.unwrap_err();
        assert!(matches!(err, RepoError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_create_insufficient_stock_names_product() {
        let pool = test_pool().await;
        // product 3 has stock 4
        let err = create(&pool, request(vec![item(3, 5)])).await.unwrap_err();
        match err {
            RepoError::Unavailable(msg) => assert!(msg.contains("明太フランス")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
        assert_eq!(stock_of(&pool, 3).await, 4);
        assert_eq!(reservation_count(&pool).await, 0);
        assert_eq!(balance_of(&pool, 1).await, 0);
    }

    #[tokio::test]
    async fn test_create_failed_line_rolls_back_earlier_decrements() {
        let pool = test_pool().await;
        // First line fits, second doesn't — nothing may stick
        let err = create(&pool, request(vec![item(1, 2), item(3, 5)]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Unavailable(_)));
        assert_eq!(stock_of(&pool, 1).await, 10);
        assert_eq!(stock_of(&pool, 3).await, 4);
        assert_eq!(reservation_count(&pool).await, 0);
        assert_eq!(point::derived_balance(&pool, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_unknown_product_not_found() {
        let pool = test_pool().await;
        let err = create(&pool, request(vec![item(1, 1), item(999, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
        assert_eq!(stock_of(&pool, 1).await, 10);
    }

    #[tokio::test]
    async fn test_create_inactive_product_not_found() {
        let pool = test_pool().await;
        let err = create(&pool, request(vec![item(4, 1)])).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
        assert_eq!(stock_of(&pool, 4).await, 9);
    }

    #[tokio::test]
    async fn test_create_unknown_user_not_found() {
        let pool = test_pool().await;
        let mut req = request(vec![item(1, 1)]);
        req.user_id = 999;
        let err = create(&pool, req).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
        assert_eq!(stock_of(&pool, 1).await, 10);
    }

    #[tokio::test]
    async fn test_points_are_floor_of_total_over_100() {
        let pool = test_pool().await;
        // 350 yen → 3 points, the 50 yen remainder earns nothing
        let detail = create(&pool, request(vec![item(3, 1)])).await.unwrap();
        assert_eq!(detail.reservation.total_amount, 350);
        assert_eq!(detail.reservation.points_earned, 3);
        assert_eq!(balance_of(&pool, 1).await, 3);
    }

    // ========== Transitions ==========

    #[tokio::test]
    async fn test_confirm_then_confirm_again_conflicts() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(1, 1)])).await.unwrap();
        let id = detail.reservation.id;

        let confirmed = confirm(&pool, id).await.unwrap();
        assert_eq!(confirmed.reservation.status, ReservationStatus::Confirmed);

        let err = confirm(&pool, id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_complete_requires_confirmed() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(1, 1)])).await.unwrap();
        let id = detail.reservation.id;

        let err = complete(&pool, id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));

        confirm(&pool, id).await.unwrap();
        let completed = complete(&pool, id).await.unwrap();
        assert_eq!(completed.reservation.status, ReservationStatus::Completed);

        // No transition back out of a terminal state
        let err = confirm(&pool, id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_exactly_once() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(1, 2), item(2, 3)]))
            .await
            .unwrap();
        let id = detail.reservation.id;
        assert_eq!(stock_of(&pool, 1).await, 8);
        assert_eq!(stock_of(&pool, 2).await, 12);

        confirm(&pool, id).await.unwrap();
        let cancelled = cancel(&pool, id).await.unwrap();
        assert_eq!(cancelled.reservation.status, ReservationStatus::Cancelled);
        assert_eq!(stock_of(&pool, 1).await, 10);
        assert_eq!(stock_of(&pool, 2).await, 15);

        // Second cancel is rejected and stock is unchanged
        let err = cancel(&pool, id).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
        assert_eq!(stock_of(&pool, 1).await, 10);
        assert_eq!(stock_of(&pool, 2).await, 15);
    }

    #[tokio::test]
    async fn test_cancel_reverses_points() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(1, 2)])).await.unwrap();
        assert_eq!(balance_of(&pool, 1).await, 16);

        cancel(&pool, detail.reservation.id).await.unwrap();
        assert_eq!(balance_of(&pool, 1).await, 0);

        // Ledger stays append-only: earn entry + reversal entry
        let entries = point::history(&pool, 1, 10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(point::derived_balance(&pool, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cancel_reversal_clamped_to_balance() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(1, 2)])).await.unwrap();
        assert_eq!(balance_of(&pool, 1).await, 16);

        // User spends 10 of the 16 points before the cancellation
        let mut conn = pool.acquire().await.unwrap();
        point::debit(&mut conn, 1, 10, PointType::Used, "ポイント利用")
            .await
            .unwrap();
        drop(conn);

        cancel(&pool, detail.reservation.id).await.unwrap();
        // Reversal clamps at the remaining 6 — never negative
        assert_eq!(balance_of(&pool, 1).await, 0);
        assert_eq!(point::derived_balance(&pool, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cancel_unknown_not_found() {
        let pool = test_pool().await;
        let err = cancel(&pool, 42).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    // ========== Coupon application ==========

    async fn seed_coupon(
        pool: &SqlitePool,
        discount_type: &str,
        value: i64,
        min_purchase: Option<i64>,
        valid_until: i64,
    ) -> i64 {
        let coupon_id = shared::util::snowflake_id();
        sqlx::query(
            "INSERT INTO coupon (id, code, name, discount_type, discount_value, min_purchase, valid_from, valid_until, is_active) VALUES (?1, ?2, 'クーポン', ?3, ?4, ?5, 0, ?6, 1)",
        )
        .bind(coupon_id)
        .bind(format!("C{coupon_id}"))
        .bind(discount_type)
        .bind(value)
        .bind(min_purchase)
        .bind(valid_until)
        .execute(pool)
        .await
        .unwrap();

        let uc_id = shared::util::snowflake_id();
        sqlx::query("INSERT INTO user_coupon (id, user_id, coupon_id, is_used) VALUES (?1, 1, ?2, 0)")
            .bind(uc_id)
            .bind(coupon_id)
            .execute(pool)
            .await
            .unwrap();
        uc_id
    }

    #[tokio::test]
    async fn test_apply_coupon_percentage() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(1, 2)])).await.unwrap(); // 1600
        let uc_id = seed_coupon(&pool, "percentage", 10, None, i64::MAX).await;

        let updated = apply_coupon(&pool, detail.reservation.id, uc_id, 1_000)
            .await
            .unwrap();
        assert_eq!(updated.reservation.total_amount, 1440);

        let uc: UserCoupon = sqlx::query_as(
            "SELECT id, user_id, coupon_id, is_used, used_at, created_at FROM user_coupon WHERE id = ?",
        )
        .bind(uc_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(uc.is_used);
        assert_eq!(uc.used_at, Some(1_000));
    }

    #[tokio::test]
    async fn test_apply_coupon_twice_conflicts_total_unchanged() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(1, 2)])).await.unwrap();
        let uc_id = seed_coupon(&pool, "fixed", 100, None, i64::MAX).await;

        apply_coupon(&pool, detail.reservation.id, uc_id, 1_000)
            .await
            .unwrap();
        let err = apply_coupon(&pool, detail.reservation.id, uc_id, 1_000)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));

        let after = find_by_id(&pool, detail.reservation.id).await.unwrap().unwrap();
        assert_eq!(after.reservation.total_amount, 1500);
    }

    #[tokio::test]
    async fn test_apply_coupon_min_purchase_not_met() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(2, 1)])).await.unwrap(); // 200
        let uc_id = seed_coupon(&pool, "fixed", 100, Some(500), i64::MAX).await;

        let err = apply_coupon(&pool, detail.reservation.id, uc_id, 1_000)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Unavailable(_)));

        let after = find_by_id(&pool, detail.reservation.id).await.unwrap().unwrap();
        assert_eq!(after.reservation.total_amount, 200);
    }

    #[tokio::test]
    async fn test_apply_coupon_expired_rejected() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(1, 2)])).await.unwrap();
        let uc_id = seed_coupon(&pool, "percentage", 10, None, 500).await;

        let err = apply_coupon(&pool, detail.reservation.id, uc_id, 1_000)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_apply_coupon_requires_pending() {
        let pool = test_pool().await;
        let detail = create(&pool, request(vec![item(1, 2)])).await.unwrap();
        let uc_id = seed_coupon(&pool, "percentage", 10, None, i64::MAX).await;

        confirm(&pool, detail.reservation.id).await.unwrap();
        let err = apply_coupon(&pool, detail.reservation.id, uc_id, 1_000)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_apply_coupon_wrong_owner_rejected() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO user (id, line_user_id) VALUES (2, 'other-user')")
            .execute(&pool)
            .await
            .unwrap();
        let detail = create(&pool, request(vec![item(1, 2)])).await.unwrap();
        let uc_id = seed_coupon(&pool, "percentage", 10, None, i64::MAX).await;
        sqlx::query("UPDATE user_coupon SET user_id = 2 WHERE id = ?")
            .bind(uc_id)
            .execute(&pool)
            .await
            .unwrap();

        let err = apply_coupon(&pool, detail.reservation.id, uc_id, 1_000)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
