use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::orders::{StaffOrderList, StaffOrderView},
    dto::products::StaffProductList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Account, Product, Profile},
    response::ApiResponse,
    routes::params::{OrderListQuery, Pagination, SalesStatsQuery, StaffProductQuery},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{id}",
            patch(update_account).delete(delete_account),
        )
        .route("/customers", get(list_customers))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            patch(update_product).delete(delete_product),
        )
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/stats/sales", get(sales_stats))
        .route("/stats/products", get(product_stats))
        .route("/stats/customers", get(customer_stats))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    pub phone: String,
    pub password: String,
    pub role_id: i16,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    pub phone: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i16>,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct AccountWithRole {
    pub id: Uuid,
    pub phone: String,
    pub role_id: i16,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AccountList {
    #[schema(value_type = Vec<AccountWithRole>)]
    pub items: Vec<AccountWithRole>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CustomerList {
    #[schema(value_type = Vec<Profile>)]
    pub items: Vec<Profile>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub import_price: i64,
    pub sell_price: i64,
    /// Defaults to 0 when omitted.
    pub stock_quantity: Option<i32>,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub import_price: Option<i64>,
    pub sell_price: Option<i64>,
    pub stock_quantity: Option<i32>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct SalesDay {
    pub day: NaiveDate,
    pub revenue: i64,
    pub orders: i64,
    pub items_sold: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesStatsResponse {
    pub days: Vec<SalesDay>,
    pub total_revenue: i64,
    pub total_orders: i64,
    pub total_items_sold: i64,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct ProductStatsRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub stock_quantity: i32,
    pub total_sold: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductStatsResponse {
    pub items: Vec<ProductStatsRow>,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct CustomerSpend {
    pub account_id: Uuid,
    pub name: String,
    pub phone: String,
    pub total_spent: i64,
    pub orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerStatsResponse {
    pub total_customers: i64,
    pub new_last_30_days: i64,
    pub active_last_30_days: i64,
    pub high_value: i64,
    pub regular: i64,
    pub occasional: i64,
    pub average_spend: f64,
    pub top_spenders: Vec<CustomerSpend>,
}

#[utoipa::path(
    get,
    path = "/api/admin/accounts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List accounts with roles (admin only)", body = ApiResponse<AccountList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<Pagination>,
) -> AppResult<Json<ApiResponse<AccountList>>> {
    let resp = admin_service::list_accounts(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Create an account with any role", body = ApiResponse<Account>),
        (status = 400, description = "Invalid role or duplicate phone"),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_account(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = admin_service::create_account(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/accounts/{id}",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Update phone, password or role", body = ApiResponse<Account>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAccountRequest>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = admin_service::update_account(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/accounts/{id}",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Delete a non-admin account", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Admin accounts cannot be deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_account(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/customers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Customer profiles (admin only)", body = ApiResponse<CustomerList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let resp = admin_service::list_customers(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Name search"),
        ("low_stock" = Option<bool>, Query, description = "Only products below the stock threshold")
    ),
    responses(
        (status = 200, description = "Products of any status with lookup names", body = ApiResponse<StaffProductList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<StaffProductQuery>,
) -> AppResult<Json<ApiResponse<StaffProductList>>> {
    let resp = admin_service::list_products(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Create a product; the code is generated, status starts pending", body = ApiResponse<Product>),
        (status = 400, description = "Invalid prices, category or brand"),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = admin_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Update product fields; the code is kept", body = ApiResponse<Product>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = admin_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Delete a product without order history", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Product has order history"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<i16>, Query, description = "Filter by status id")
    ),
    responses(
        (status = 200, description = "All orders with customer details", body = ApiResponse<StaffOrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<StaffOrderList>>> {
    let resp = admin_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Any order with lines and customer", body = ApiResponse<StaffOrderView>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StaffOrderView>>> {
    let resp = admin_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats/sales",
    params(
        ("from" = Option<NaiveDate>, Query, description = "Window start, default 30 days ago"),
        ("to" = Option<NaiveDate>, Query, description = "Window end, default today")
    ),
    responses(
        (status = 200, description = "Daily revenue and units sold", body = ApiResponse<SalesStatsResponse>),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn sales_stats(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SalesStatsQuery>,
) -> AppResult<Json<ApiResponse<SalesStatsResponse>>> {
    let resp = admin_service::sales_stats(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats/products",
    responses(
        (status = 200, description = "Stock and units sold per product", body = ApiResponse<ProductStatsResponse>),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn product_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProductStatsResponse>>> {
    let resp = admin_service::product_stats(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats/customers",
    responses(
        (status = 200, description = "Customer counts, spending segments and top spenders", body = ApiResponse<CustomerStatsResponse>),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn customer_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CustomerStatsResponse>>> {
    let resp = admin_service::customer_stats(&state, &user).await?;
    Ok(Json(resp))
}
