//! Demo seed data for manual testing (fresh database only)
//!
//! ```text
//! WORK_DIR=./data cargo run --bin seed
//! ```

use shared::models::{
    CategoryCreate, CouponCreate, DiscountType, PointType, ProductCreate, UserUpsert,
};
use soleil_server::db::repository::{business_day, category, coupon, point, user};
use soleil_server::{Config, ServerState, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_environment()?;

    let config = Config::from_env();
    let state = ServerState::initialize(&config).await;
    let pool = &state.pool;

    tracing::info!("Seeding database at {:?}...", config.database_path());

    // Categories
    let categories = [
        ("食パン", "shokupan", 1),
        ("菓子パン", "kashipan", 2),
        ("惣菜パン", "souzaipan", 3),
        ("ハード系", "hard", 4),
        ("サンドイッチ", "sandwich", 5),
    ];
    let mut category_ids = Vec::new();
    for (name, slug, order) in categories {
        let c = category::create(
            pool,
            CategoryCreate {
                name: name.into(),
                slug: slug.into(),
                display_order: Some(order),
            },
        )
        .await?;
        category_ids.push(c.id);
    }
    tracing::info!("Categories created: {}", category_ids.len());

    // Products (name, category index, price, stock, allergens)
    let products: [(&str, usize, i64, i64, &str); 8] = [
        ("極上生食パン", 0, 800, 10, "小麦, 乳, 卵"),
        ("全粒粉食パン", 0, 450, 8, "小麦"),
        ("クリームパン", 1, 200, 15, "小麦, 乳, 卵"),
        ("メロンパン", 1, 180, 12, "小麦, 乳, 卵"),
        ("カレーパン", 2, 250, 12, "小麦, 乳, 卵"),
        ("明太フランス", 2, 350, 4, "小麦, 乳, 卵"),
        ("バゲット", 3, 300, 8, "小麦"),
        ("たまごサンド", 4, 380, 8, "小麦, 卵"),
    ];
    for (name, cat, price, stock, allergens) in products {
        soleil_server::db::repository::product::create(
            pool,
            ProductCreate {
                name: name.into(),
                description: None,
                price,
                image_url: None,
                category_id: category_ids[cat],
                stock,
                max_reserve_qty: Some(3),
                is_new: Some(false),
                is_popular: Some(false),
                allergens: Some(allergens.into()),
            },
        )
        .await?;
    }
    tracing::info!("Products created: {}", products.len());

    // Coupons (valid for one month from now)
    let now = shared::util::now_millis();
    let one_month = now + 30 * 24 * 3600 * 1000;
    let coupons = [
        CouponCreate {
            code: "RAINY10".into(),
            name: "雨の日クーポン 10%OFF".into(),
            description: Some("雨の日にご来店いただいたお客様限定のクーポンです。".into()),
            discount_type: DiscountType::Percentage,
            discount_value: 10,
            min_purchase: None,
            valid_from: now,
            valid_until: one_month,
            conditions: Some("rain".into()),
        },
        CouponCreate {
            code: "WELCOME100".into(),
            name: "初回来店クーポン ¥100OFF".into(),
            description: Some("初回のお買い物にご利用ください。".into()),
            discount_type: DiscountType::Fixed,
            discount_value: 100,
            min_purchase: Some(500),
            valid_from: now,
            valid_until: one_month,
            conditions: Some("first_visit".into()),
        },
        CouponCreate {
            code: "BREAD15".into(),
            name: "食パン15%OFF".into(),
            description: Some("食パン全品が15%OFF！".into()),
            discount_type: DiscountType::Percentage,
            discount_value: 15,
            min_purchase: None,
            valid_from: now,
            valid_until: one_month,
            conditions: None,
        },
    ];
    for c in coupons {
        coupon::create(pool, c).await?;
    }
    tracing::info!("Coupons created: 3");

    // Regular holiday: Monday
    business_day::replace_holidays(pool, &[1]).await?;
    tracing::info!("Regular holidays set");

    // Demo user + welcome coupon + starter points
    let outcome = user::upsert(
        pool,
        UserUpsert {
            line_user_id: "demo-user".into(),
            display_name: Some("デモユーザー".into()),
            picture_url: None,
        },
    )
    .await?;

    if let Some(welcome) = coupon::find_first_visit_active(pool).await? {
        coupon::grant(pool, outcome.user.id, welcome.id).await?;
    }

    let mut conn = pool.acquire().await?;
    point::credit(
        &mut conn,
        outcome.user.id,
        100,
        PointType::Earned,
        "初回登録ボーナス",
    )
    .await?;
    point::credit(
        &mut conn,
        outcome.user.id,
        50,
        PointType::Earned,
        "お買い物ポイント",
    )
    .await?;

    tracing::info!("Seeding completed!");
    Ok(())
}
