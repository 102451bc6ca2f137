use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{StaffOrderList, StaffOrderView},
    dto::products::StaffProductList,
    entity::{
        accounts::{ActiveModel as AccountActive, Entity as Accounts, Model as AccountModel},
        products::{ActiveModel as ProductActive, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_BUYER, ensure_admin},
    models::{Account, Product, Profile},
    response::{ApiResponse, Meta},
    routes::admin::{
        AccountList, AccountWithRole, CreateAccountRequest, CreateProductRequest, CustomerList,
        CustomerSpend, CustomerStatsResponse, ProductStatsResponse, ProductStatsRow, SalesDay,
        SalesStatsResponse, UpdateAccountRequest, UpdateProductRequest,
    },
    routes::params::{OrderListQuery, Pagination, SalesStatsQuery, StaffProductQuery},
    services::{auth_service, order_service, product_service},
    state::AppState,
};

pub async fn list_accounts(
    state: &AppState,
    user: &AuthUser,
    query: Pagination,
) -> AppResult<ApiResponse<AccountList>> {
    ensure_admin(user)?;
    let (page, per_page, offset) = query.normalize();

    let items = sqlx::query_as::<_, AccountWithRole>(
        r#"
        SELECT a.id, a.phone, a.role_id, r.name AS role_name, a.created_at
        FROM accounts a
        JOIN roles r ON r.id = a.role_id
        ORDER BY a.created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Accounts",
        AccountList { items },
        Some(Meta::new(page, per_page, total.0)),
    ))
}

pub async fn create_account(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAccountRequest,
) -> AppResult<ApiResponse<Account>> {
    ensure_admin(user)?;
    auth_service::validate_phone(&payload.phone)?;
    auth_service::validate_password(&payload.password)?;

    let role: Option<(i16,)> = sqlx::query_as("SELECT id FROM roles WHERE id = $1")
        .bind(payload.role_id)
        .fetch_optional(&state.pool)
        .await?;
    if role.is_none() {
        return Err(AppError::BadRequest("Invalid role".to_string()));
    }

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM accounts WHERE phone = $1")
        .bind(&payload.phone)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "Phone number is already registered".to_string(),
        ));
    }

    let hash = auth_service::hash_password(&payload.password)?;

    let mut tx = state.pool.begin().await?;
    let account: Account = sqlx::query_as(
        r#"
        INSERT INTO accounts (id, phone, password_hash, role_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, phone, role_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&payload.phone)
    .bind(&hash)
    .bind(payload.role_id)
    .fetch_one(&mut *tx)
    .await?;
    sqlx::query("INSERT INTO profiles (id, account_id, phone) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(account.id)
        .bind(&payload.phone)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "account_create",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": account.id, "role_id": account.role_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Account created",
        account,
        Some(Meta::empty()),
    ))
}

pub async fn update_account(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAccountRequest,
) -> AppResult<ApiResponse<Account>> {
    ensure_admin(user)?;
    let existing = Accounts::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };

    let mut active: AccountActive = existing.into();
    if let Some(phone) = &payload.phone {
        auth_service::validate_phone(phone)?;
        let taken: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM accounts WHERE phone = $1 AND id <> $2")
                .bind(phone)
                .bind(id)
                .fetch_optional(&state.pool)
                .await?;
        if taken.is_some() {
            return Err(AppError::BadRequest(
                "Phone number is already registered".to_string(),
            ));
        }
        active.phone = Set(phone.clone());
    }
    if let Some(password) = &payload.password {
        auth_service::validate_password(password)?;
        active.password_hash = Set(auth_service::hash_password(password)?);
    }
    if let Some(role_id) = payload.role_id {
        let role: Option<(i16,)> = sqlx::query_as("SELECT id FROM roles WHERE id = $1")
            .bind(role_id)
            .fetch_optional(&state.pool)
            .await?;
        if role.is_none() {
            return Err(AppError::BadRequest("Invalid role".to_string()));
        }
        active.role_id = Set(role_id);
    }

    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "account_update",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Account updated",
        account_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_account(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let existing = Accounts::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };
    if existing.role_id == ROLE_ADMIN {
        return Err(AppError::BadRequest(
            "Admin accounts cannot be deleted".to_string(),
        ));
    }

    // Profile, cart, orders and comments go with the account via FK cascade.
    Accounts::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "account_delete",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Account deleted"))
}

pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    query: Pagination,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_admin(user)?;
    let (page, per_page, offset) = query.normalize();

    let items = sqlx::query_as::<_, Profile>(
        r#"
        SELECT pr.id, pr.account_id, pr.name, pr.email, pr.phone, pr.address,
               pr.city, pr.district, pr.ward, pr.created_at
        FROM profiles pr
        JOIN accounts a ON a.id = pr.account_id
        WHERE a.role_id = $1
        ORDER BY pr.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(ROLE_BUYER)
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM profiles pr JOIN accounts a ON a.id = pr.account_id WHERE a.role_id = $1",
    )
    .bind(ROLE_BUYER)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(Meta::new(page, per_page, total.0)),
    ))
}

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: StaffProductQuery,
) -> AppResult<ApiResponse<StaffProductList>> {
    ensure_admin(user)?;
    let (items, meta) = product_service::staff_product_rows(state, &query).await?;
    Ok(ApiResponse::success(
        "Products",
        StaffProductList { items },
        Some(meta),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.sell_price <= payload.import_price {
        return Err(AppError::BadRequest(
            "Sell price must be greater than import price".to_string(),
        ));
    }
    if let Some(quantity) = payload.stock_quantity {
        if quantity < 0 {
            return Err(AppError::BadRequest(
                "Stock quantity cannot be negative".to_string(),
            ));
        }
    }

    let category: Option<(String,)> = sqlx::query_as("SELECT name FROM categories WHERE id = $1")
        .bind(payload.category_id)
        .fetch_optional(&state.pool)
        .await?;
    let category = match category {
        Some((name,)) => name,
        None => return Err(AppError::BadRequest("Invalid category".to_string())),
    };
    let brand: Option<(String,)> = sqlx::query_as("SELECT name FROM brands WHERE id = $1")
        .bind(payload.brand_id)
        .fetch_optional(&state.pool)
        .await?;
    let brand = match brand {
        Some((name,)) => name,
        None => return Err(AppError::BadRequest("Invalid brand".to_string())),
    };

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&state.pool)
        .await?;
    let code = build_product_code(&category, &brand, count.0 + 1);

    // New products wait for seller approval before they can be listed.
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        name: Set(payload.name),
        description: Set(payload.description),
        import_price: Set(payload.import_price),
        sell_price: Set(payload.sell_price),
        stock_quantity: Set(payload.stock_quantity.unwrap_or(0)),
        category_id: Set(payload.category_id),
        brand_id: Set(payload.brand_id),
        is_hot: Set(false),
        status: Set(product_service::STATUS_PENDING),
        images: Set(payload.images),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id, "code": product.code })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_service::product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    // The code never regenerates and the price relation is only checked at
    // creation time.
    let mut active: ProductActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(import_price) = payload.import_price {
        active.import_price = Set(import_price);
    }
    if let Some(sell_price) = payload.sell_price {
        active.sell_price = Set(sell_price);
    }
    if let Some(stock_quantity) = payload.stock_quantity {
        if stock_quantity < 0 {
            return Err(AppError::BadRequest(
                "Stock quantity cannot be negative".to_string(),
            ));
        }
        active.stock_quantity = Set(stock_quantity);
    }
    if let Some(category_id) = payload.category_id {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(&state.pool)
            .await?;
        if found.is_none() {
            return Err(AppError::BadRequest("Invalid category".to_string()));
        }
        active.category_id = Set(category_id);
    }
    if let Some(brand_id) = payload.brand_id {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM brands WHERE id = $1")
            .bind(brand_id)
            .fetch_optional(&state.pool)
            .await?;
        if found.is_none() {
            return Err(AppError::BadRequest("Invalid brand".to_string()));
        }
        active.brand_id = Set(brand_id);
    }
    if let Some(images) = payload.images {
        active.images = Set(images);
    }

    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product updated",
        product_service::product_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let referenced: Option<(Uuid,)> =
        sqlx::query_as("SELECT product_id FROM order_items WHERE product_id = $1 LIMIT 1")
            .bind(id)
            .fetch_optional(&state.pool)
            .await?;
    if referenced.is_some() {
        return Err(AppError::BadRequest(
            "Product has order history and cannot be deleted".to_string(),
        ));
    }

    // Cart lines keep the dangling reference and drop out of reads.
    Products::delete_by_id(id).exec(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id, "code": existing.code })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Product deleted"))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<StaffOrderList>> {
    ensure_admin(user)?;
    let (items, meta) = order_service::staff_order_views(state, &query).await?;
    Ok(ApiResponse::success(
        "Orders",
        StaffOrderList { items },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<StaffOrderView>> {
    ensure_admin(user)?;
    let view = order_service::staff_order_view(state, id).await?;
    Ok(ApiResponse::success("Order", view, Some(Meta::empty())))
}

/// Daily revenue and units sold over the requested window, defaulting to the
/// last 30 days.
pub async fn sales_stats(
    state: &AppState,
    user: &AuthUser,
    query: SalesStatsQuery,
) -> AppResult<ApiResponse<SalesStatsResponse>> {
    ensure_admin(user)?;
    let to = query.to.unwrap_or_else(|| Utc::now().date_naive());
    let from = query.from.unwrap_or_else(|| to - Duration::days(30));
    if from > to {
        return Err(AppError::BadRequest("from must not be after to".to_string()));
    }

    let days = sqlx::query_as::<_, SalesDay>(
        r#"
        SELECT r.day, r.revenue, r.orders, COALESCE(s.items_sold, 0) AS items_sold
        FROM (
            SELECT o.created_at::date AS day, SUM(o.total_price)::BIGINT AS revenue,
                   COUNT(*)::BIGINT AS orders
            FROM orders o
            WHERE o.created_at::date BETWEEN $1 AND $2
            GROUP BY o.created_at::date
        ) r
        LEFT JOIN (
            SELECT o.created_at::date AS day, SUM(oi.quantity)::BIGINT AS items_sold
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.created_at::date BETWEEN $1 AND $2
            GROUP BY o.created_at::date
        ) s ON s.day = r.day
        ORDER BY r.day
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(&state.pool)
    .await?;

    let total_revenue = days.iter().map(|d| d.revenue).sum();
    let total_orders = days.iter().map(|d| d.orders).sum();
    let total_items_sold = days.iter().map(|d| d.items_sold).sum();

    Ok(ApiResponse::success(
        "Sales statistics",
        SalesStatsResponse {
            days,
            total_revenue,
            total_orders,
            total_items_sold,
        },
        Some(Meta::empty()),
    ))
}

pub async fn product_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProductStatsResponse>> {
    ensure_admin(user)?;
    let items = sqlx::query_as::<_, ProductStatsRow>(
        r#"
        SELECT p.id, p.code, p.name, p.stock_quantity,
               COALESCE(SUM(oi.quantity), 0)::BIGINT AS total_sold
        FROM products p
        LEFT JOIN order_items oi ON oi.product_id = p.id
        GROUP BY p.id
        ORDER BY total_sold DESC, p.created_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Product statistics",
        ProductStatsResponse { items },
        Some(Meta::empty()),
    ))
}

/// Spending segments: above 10M VND, above 5M, anything above zero.
pub async fn customer_stats(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CustomerStatsResponse>> {
    ensure_admin(user)?;

    let total_customers: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE role_id = $1")
            .bind(ROLE_BUYER)
            .fetch_one(&state.pool)
            .await?;
    let new_last_30_days: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM accounts WHERE role_id = $1 AND created_at >= now() - interval '30 days'",
    )
    .bind(ROLE_BUYER)
    .fetch_one(&state.pool)
    .await?;
    let active_last_30_days: (i64,) = sqlx::query_as(
        "SELECT COUNT(DISTINCT account_id) FROM orders WHERE created_at >= now() - interval '30 days'",
    )
    .fetch_one(&state.pool)
    .await?;

    let spend = sqlx::query_as::<_, CustomerSpend>(
        r#"
        SELECT o.account_id, pr.name, pr.phone, SUM(o.total_price)::BIGINT AS total_spent,
               COUNT(*)::BIGINT AS orders
        FROM orders o
        JOIN profiles pr ON pr.account_id = o.account_id
        GROUP BY o.account_id, pr.name, pr.phone
        ORDER BY total_spent DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let mut high_value = 0i64;
    let mut regular = 0i64;
    let mut occasional = 0i64;
    for row in &spend {
        if row.total_spent > 10_000_000 {
            high_value += 1;
        } else if row.total_spent > 5_000_000 {
            regular += 1;
        } else if row.total_spent > 0 {
            occasional += 1;
        }
    }
    let average_spend = if spend.is_empty() {
        0.0
    } else {
        spend.iter().map(|r| r.total_spent).sum::<i64>() as f64 / spend.len() as f64
    };
    let top_spenders: Vec<CustomerSpend> = spend.into_iter().take(5).collect();

    Ok(ApiResponse::success(
        "Customer statistics",
        CustomerStatsResponse {
            total_customers: total_customers.0,
            new_last_30_days: new_last_30_days.0,
            active_last_30_days: active_last_30_days.0,
            high_value,
            regular,
            occasional,
            average_spend,
            top_spenders,
        },
        Some(Meta::empty()),
    ))
}

/// Category prefixes follow the house SKU convention.
pub fn category_prefix(name: &str) -> String {
    match name {
        "Ốp lưng" => "OP".to_string(),
        "Củ sạc" => "CS".to_string(),
        "Cáp sạc" => "DS".to_string(),
        "Tai nghe" => "TN".to_string(),
        "Sạc dự phòng pin" => "SDP".to_string(),
        "Giá đỡ điện thoại" => "GDT".to_string(),
        "Loa bluetooth" => "LB".to_string(),
        other => other.chars().take(2).collect::<String>().to_uppercase(),
    }
}

pub fn brand_prefix(name: &str) -> String {
    name.chars().take(3).collect::<String>().to_uppercase()
}

/// `OP-APP-0001` style codes: category prefix, brand prefix, running number.
pub fn build_product_code(category: &str, brand: &str, seq: i64) -> String {
    format!(
        "{}-{}-{:04}",
        category_prefix(category),
        brand_prefix(brand),
        seq
    )
}

fn account_from_entity(model: AccountModel) -> Account {
    Account {
        id: model.id,
        phone: model.phone,
        role_id: model.role_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
