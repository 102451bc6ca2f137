use chrono::{Duration, Utc};
use phone_accessory_api::{
    config::{AppConfig, DEFAULT_PROVINCES_API_BASE},
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{
        accounts::ActiveModel as AccountActive,
        brands::ActiveModel as BrandActive,
        categories::ActiveModel as CategoryActive,
        order_items::ActiveModel as OrderItemActive,
        orders::ActiveModel as OrderActive,
        profiles::ActiveModel as ProfileActive,
    },
    error::AppError,
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_BUYER, ROLE_SELLER},
    routes::admin::{CreateAccountRequest, CreateProductRequest, UpdateAccountRequest},
    routes::params::{OrderListQuery, Pagination, SalesStatsQuery, StaffProductQuery},
    routes::seller::{SetProductHotRequest, SetProductStatusRequest, UpdateOrderStatusRequest},
    services::{
        admin_service,
        order_service::STATUS_PROCESSING,
        product_service::STATUS_APPROVED,
        seller_service,
    },
    state::AppState,
};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: admin account management and product creation, seller
// moderation and order handling, then the dashboard statistics.
#[tokio::test]
async fn admin_and_seller_dashboard_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let admin = seed_account(&state, "0900000001", ROLE_ADMIN, "Quản trị viên").await?;
    let seller = seed_account(&state, "0900000002", ROLE_SELLER, "Nhân viên").await?;
    let buyer = seed_account(&state, "0900000003", ROLE_BUYER, "Nguyễn Văn An").await?;

    // Role guards cut both ways.
    let err = admin_service::list_accounts(&state, &buyer, default_pagination())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = seller_service::list_products(&state, &admin, staff_product_query(None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Account management
    let created = admin_service::create_account(
        &state,
        &admin,
        CreateAccountRequest {
            phone: "0988888888".into(),
            password: "seller123".into(),
            role_id: ROLE_SELLER,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.role_id, ROLE_SELLER);

    let err = admin_service::create_account(
        &state,
        &admin,
        CreateAccountRequest {
            phone: "0988888888".into(),
            password: "seller123".into(),
            role_id: ROLE_SELLER,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("already registered")));

    let err = admin_service::create_account(
        &state,
        &admin,
        CreateAccountRequest {
            phone: "0977777777".into(),
            password: "seller123".into(),
            role_id: 9,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("Invalid role")));

    let err = admin_service::create_account(
        &state,
        &admin,
        CreateAccountRequest {
            phone: "123".into(),
            password: "seller123".into(),
            role_id: ROLE_SELLER,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    admin_service::update_account(
        &state,
        &admin,
        created.id,
        UpdateAccountRequest {
            phone: None,
            password: Some("changed123".into()),
            role_id: None,
        },
    )
    .await?;

    // Admin accounts are protected from deletion; others cascade away.
    let err = admin_service::delete_account(&state, &admin, admin.user_id)
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("cannot be deleted")));
    admin_service::delete_account(&state, &admin, created.id).await?;

    let accounts = admin_service::list_accounts(&state, &admin, default_pagination())
        .await?
        .data
        .unwrap();
    assert_eq!(accounts.items.len(), 3);

    // Product creation runs the price check, resolves the lookup names into
    // the code and always starts out pending.
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set("Tai nghe".into()),
    }
    .insert(&state.orm)
    .await?;
    let brand = BrandActive {
        id: Set(Uuid::new_v4()),
        name: Set("Samsung".into()),
    }
    .insert(&state.orm)
    .await?;

    let err = admin_service::create_product(
        &state,
        &admin,
        product_request(
            "Tai nghe Galaxy Buds 3",
            500_000,
            400_000,
            Some(20),
            category.id,
            brand.id,
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("Sell price")));

    let err = admin_service::create_product(
        &state,
        &admin,
        product_request(
            "Tai nghe Galaxy Buds 3",
            500_000,
            900_000,
            Some(-1),
            category.id,
            brand.id,
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("Stock quantity")));

    let err = admin_service::create_product(
        &state,
        &admin,
        product_request(
            "Tai nghe Galaxy Buds 3",
            500_000,
            900_000,
            Some(20),
            Uuid::new_v4(),
            brand.id,
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("Invalid category")));

    let first = admin_service::create_product(
        &state,
        &admin,
        product_request(
            "Tai nghe Galaxy Buds 3",
            500_000,
            900_000,
            Some(20),
            category.id,
            brand.id,
        ),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(first.code, "TN-SAM-0001");
    assert_eq!(first.status, 1);
    assert!(!first.is_hot);

    // Omitted stock defaults to zero, and the running number advances.
    let second = admin_service::create_product(
        &state,
        &admin,
        product_request(
            "Tai nghe Galaxy Buds FE",
            300_000,
            600_000,
            None,
            category.id,
            brand.id,
        ),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(second.code, "TN-SAM-0002");
    assert_eq!(second.stock_quantity, 0);

    // Seller moderation: featuring requires approval first.
    let err = seller_service::set_product_hot(
        &state,
        &seller,
        first.id,
        SetProductHotRequest { is_hot: true },
    )
    .await
    .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("Only approved")));

    let err = seller_service::set_product_status(
        &state,
        &seller,
        first.id,
        SetProductStatusRequest { status: 9 },
    )
    .await
    .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("Invalid product status")));

    let approved = seller_service::set_product_status(
        &state,
        &seller,
        first.id,
        SetProductStatusRequest {
            status: STATUS_APPROVED,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(approved.status, STATUS_APPROVED);

    let featured = seller_service::set_product_hot(
        &state,
        &seller,
        first.id,
        SetProductHotRequest { is_hot: true },
    )
    .await?
    .data
    .unwrap();
    assert!(featured.is_hot);

    let err = seller_service::set_product_status(
        &state,
        &seller,
        Uuid::new_v4(),
        SetProductStatusRequest {
            status: STATUS_APPROVED,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // The low-stock alert only shows products under the threshold.
    let low = seller_service::list_products(&state, &seller, staff_product_query(Some(true)))
        .await?
        .data
        .unwrap();
    assert_eq!(low.items.len(), 1);
    assert_eq!(low.items[0].id, second.id);

    // Orders seeded a day back so the default statistics window covers them.
    let yesterday = Utc::now() - Duration::days(1);
    let address = "12 Nguyễn Trãi, Phường Bến Thành, Quận 1, Thành phố Hồ Chí Minh";
    let order1 = OrderActive {
        id: Set(Uuid::new_v4()),
        account_id: Set(buyer.user_id),
        total_price: Set(100_000),
        status: Set(1),
        shipping_address: Set(address.into()),
        created_at: Set(yesterday.into()),
    }
    .insert(&state.orm)
    .await?;
    let order2 = OrderActive {
        id: Set(Uuid::new_v4()),
        account_id: Set(buyer.user_id),
        total_price: Set(200_000),
        status: Set(1),
        shipping_address: Set(address.into()),
        created_at: Set(yesterday.into()),
    }
    .insert(&state.orm)
    .await?;
    OrderItemActive {
        order_id: Set(order1.id),
        product_id: Set(first.id),
        quantity: Set(1),
    }
    .insert(&state.orm)
    .await?;
    OrderItemActive {
        order_id: Set(order2.id),
        product_id: Set(second.id),
        quantity: Set(2),
    }
    .insert(&state.orm)
    .await?;

    // Order handling on the seller portal.
    let updated = seller_service::update_order_status(
        &state,
        &seller,
        order1.id,
        UpdateOrderStatusRequest {
            status: STATUS_PROCESSING,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.status, STATUS_PROCESSING);

    let err = seller_service::update_order_status(
        &state,
        &seller,
        order1.id,
        UpdateOrderStatusRequest { status: 9 },
    )
    .await
    .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("Invalid order status")));

    let err = seller_service::update_order_status(
        &state,
        &seller,
        Uuid::new_v4(),
        UpdateOrderStatusRequest {
            status: STATUS_PROCESSING,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let detail = admin_service::get_order(&state, &admin, order1.id)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.customer_name, "Nguyễn Văn An");
    assert_eq!(detail.items.len(), 1);

    let processing = admin_service::list_orders(
        &state,
        &admin,
        OrderListQuery {
            pagination: Pagination {
                page: None,
                per_page: None,
            },
            status: Some(STATUS_PROCESSING),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(processing.items.len(), 1);
    assert_eq!(processing.items[0].id, order1.id);

    let all_orders = admin_service::list_orders(
        &state,
        &admin,
        OrderListQuery {
            pagination: Pagination {
                page: None,
                per_page: None,
            },
            status: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(all_orders.items.len(), 2);

    // Statistics
    let sales = admin_service::sales_stats(
        &state,
        &admin,
        SalesStatsQuery {
            from: None,
            to: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(sales.total_revenue, 300_000);
    assert_eq!(sales.total_orders, 2);
    assert_eq!(sales.total_items_sold, 3);
    assert_eq!(sales.days.len(), 1);

    let err = admin_service::sales_stats(
        &state,
        &admin,
        SalesStatsQuery {
            from: Some(Utc::now().date_naive()),
            to: Some(Utc::now().date_naive() - Duration::days(1)),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(&err, AppError::BadRequest(msg) if msg.contains("from")));

    let products = admin_service::product_stats(&state, &admin)
        .await?
        .data
        .unwrap();
    assert_eq!(products.items.len(), 2);
    assert_eq!(products.items[0].id, second.id);
    assert_eq!(products.items[0].total_sold, 2);

    let customers = admin_service::customer_stats(&state, &admin)
        .await?
        .data
        .unwrap();
    assert_eq!(customers.total_customers, 1);
    assert_eq!(customers.active_last_30_days, 1);
    assert_eq!(customers.occasional, 1);
    assert_eq!(customers.high_value, 0);
    assert_eq!(customers.average_spend, 300_000.0);
    assert_eq!(customers.top_spenders.len(), 1);
    assert_eq!(customers.top_spenders[0].total_spent, 300_000);
    assert_eq!(customers.top_spenders[0].orders, 2);

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean data tables between runs; the lookup tables keep their seed rows.
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, carts, comments, audit_logs, products, profiles, accounts, categories, brands RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        provinces_api_base: DEFAULT_PROVINCES_API_BASE.to_string(),
        admin_secret_key: "a1b2c3d4e5f6".to_string(),
    };
    Ok(AppState { pool, orm, config })
}

async fn seed_account(
    state: &AppState,
    phone: &str,
    role_id: i16,
    name: &str,
) -> anyhow::Result<AuthUser> {
    let account = AccountActive {
        id: Set(Uuid::new_v4()),
        phone: Set(phone.into()),
        password_hash: Set("unused".into()),
        role_id: Set(role_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    ProfileActive {
        id: Set(Uuid::new_v4()),
        account_id: Set(account.id),
        name: Set(name.into()),
        email: Set(String::new()),
        phone: Set(phone.into()),
        address: Set(String::new()),
        city: Set(String::new()),
        district: Set(String::new()),
        ward: Set(String::new()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(AuthUser {
        user_id: account.id,
        role_id,
    })
}

fn default_pagination() -> Pagination {
    Pagination {
        page: None,
        per_page: None,
    }
}

fn staff_product_query(low_stock: Option<bool>) -> StaffProductQuery {
    StaffProductQuery {
        pagination: default_pagination(),
        q: None,
        low_stock,
    }
}

fn product_request(
    name: &str,
    import_price: i64,
    sell_price: i64,
    stock_quantity: Option<i32>,
    category_id: Uuid,
    brand_id: Uuid,
) -> CreateProductRequest {
    CreateProductRequest {
        name: name.into(),
        description: "Hàng chính hãng".into(),
        import_price,
        sell_price,
        stock_quantity,
        category_id,
        brand_id,
        images: vec![],
    }
}
