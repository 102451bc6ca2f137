use std::collections::HashMap;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use phone_accessory_api::{
    config::AppConfig,
    db::create_pool,
    middleware::auth::{ROLE_ADMIN, ROLE_BUYER, ROLE_SELLER},
    services::product_service::STATUS_APPROVED,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_account(&pool, "0900000001", "admin123", ROLE_ADMIN, "Quản trị viên").await?;
    let seller_id = ensure_account(&pool, "0900000002", "seller123", ROLE_SELLER, "Nhân viên bán hàng").await?;
    let buyer_id = ensure_account(&pool, "0900000003", "user123", ROLE_BUYER, "Nguyễn Văn An").await?;
    // The demo buyer needs a complete address so checkout against the
    // profile works without a prior update.
    fill_buyer_address(&pool, buyer_id).await?;

    seed_catalog(&pool).await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Seller ID: {seller_id}, Buyer ID: {buyer_id}");
    Ok(())
}

async fn ensure_account(
    pool: &sqlx::PgPool,
    phone: &str,
    password: &str,
    role_id: i16,
    name: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (account_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO accounts (id, phone, password_hash, role_id)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (phone) DO UPDATE SET role_id = EXCLUDED.role_id
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(phone)
    .bind(password_hash)
    .bind(role_id)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO profiles (id, account_id, name, phone)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (account_id) DO UPDATE SET name = EXCLUDED.name
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(account_id)
    .bind(name)
    .bind(phone)
    .execute(pool)
    .await?;

    println!("Ensured account {phone} (role_id={role_id})");
    Ok(account_id)
}

async fn fill_buyer_address(pool: &sqlx::PgPool, account_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE profiles
        SET address = $2, city = $3, district = $4, ward = $5
        WHERE account_id = $1
        "#,
    )
    .bind(account_id)
    .bind("12 Nguyễn Trãi")
    .bind("Thành phố Hồ Chí Minh")
    .bind("Quận 1")
    .bind("Phường Bến Thành")
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = [
        "Ốp lưng",
        "Củ sạc",
        "Cáp sạc",
        "Tai nghe",
        "Sạc dự phòng pin",
        "Giá đỡ điện thoại",
        "Loa bluetooth",
    ];
    for name in categories {
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .execute(pool)
            .await?;
    }

    let brands = ["Apple", "Samsung", "Xiaomi", "Anker", "Baseus", "Sony"];
    for name in brands {
        sqlx::query("INSERT INTO brands (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .execute(pool)
            .await?;
    }

    println!("Seeded categories and brands");
    Ok(())
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories: HashMap<String, Uuid> =
        sqlx::query_as::<_, (String, Uuid)>("SELECT name, id FROM categories")
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();
    let brands: HashMap<String, Uuid> =
        sqlx::query_as::<_, (String, Uuid)>("SELECT name, id FROM brands")
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect();

    // (code, name, category, brand, import_price, sell_price, stock, is_hot)
    let products = vec![
        ("OP-APP-0001", "Ốp lưng MagSafe iPhone 15 Pro", "Ốp lưng", "Apple", 90_000_i64, 190_000_i64, 120, true),
        ("OP-SAM-0002", "Ốp lưng chống sốc Galaxy S24 Ultra", "Ốp lưng", "Samsung", 60_000, 140_000, 80, false),
        ("CS-ANK-0003", "Củ sạc nhanh Anker Nano 20W", "Củ sạc", "Anker", 250_000, 390_000, 60, true),
        ("DS-BAS-0004", "Cáp sạc Baseus USB-C 100W 1m", "Cáp sạc", "Baseus", 80_000, 150_000, 200, false),
        ("TN-APP-0005", "Tai nghe AirPods Pro 2", "Tai nghe", "Apple", 4_500_000, 5_990_000, 15, true),
        ("TN-SON-0006", "Tai nghe Sony WH-1000XM5", "Tai nghe", "Sony", 5_500_000, 6_990_000, 8, false),
        ("SDP-XIA-0007", "Sạc dự phòng Xiaomi 20000mAh 22.5W", "Sạc dự phòng pin", "Xiaomi", 350_000, 520_000, 45, false),
        ("GDT-BAS-0008", "Giá đỡ điện thoại Baseus gắn táp-lô", "Giá đỡ điện thoại", "Baseus", 120_000, 220_000, 5, false),
        ("LB-SON-0009", "Loa bluetooth Sony SRS-XB100", "Loa bluetooth", "Sony", 900_000, 1_290_000, 30, false),
    ];

    for (code, name, category, brand, import_price, sell_price, stock, is_hot) in products {
        let category_id = categories
            .get(category)
            .ok_or_else(|| anyhow::anyhow!("missing category {category}"))?;
        let brand_id = brands
            .get(brand)
            .ok_or_else(|| anyhow::anyhow!("missing brand {brand}"))?;
        let images = vec![format!("/images/{}.jpg", code.to_lowercase())];

        sqlx::query(
            r#"
            INSERT INTO products
                (id, code, name, description, import_price, sell_price,
                 stock_quantity, category_id, brand_id, is_hot, status, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(name)
        .bind(format!("{name} chính hãng, bảo hành 12 tháng."))
        .bind(import_price)
        .bind(sell_price)
        .bind(stock)
        .bind(category_id)
        .bind(brand_id)
        .bind(is_hot)
        .bind(STATUS_APPROVED)
        .bind(&images)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
