use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::orders::StaffOrderList,
    dto::products::StaffProductList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Order, Product},
    response::ApiResponse,
    routes::params::{OrderListQuery, StaffProductQuery},
    services::seller_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}/status", patch(set_product_status))
        .route("/products/{id}/hot", patch(set_product_hot))
        .route("/orders", get(list_orders))
        .route("/orders/{id}/status", patch(update_order_status))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetProductStatusRequest {
    pub status: i16,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetProductHotRequest {
    pub is_hot: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: i16,
}

#[utoipa::path(
    get,
    path = "/api/seller/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Name search"),
        ("low_stock" = Option<bool>, Query, description = "Only products below the stock threshold")
    ),
    responses(
        (status = 200, description = "Products of any status (seller only)", body = ApiResponse<StaffProductList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<StaffProductQuery>,
) -> AppResult<Json<ApiResponse<StaffProductList>>> {
    let resp = seller_service::list_products(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/seller/products/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = SetProductStatusRequest,
    responses(
        (status = 200, description = "Approve or reject a product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn set_product_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetProductStatusRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = seller_service::set_product_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/seller/products/{id}/hot",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = SetProductHotRequest,
    responses(
        (status = 200, description = "Feature or unfeature an approved product", body = ApiResponse<Product>),
        (status = 400, description = "Only approved products can be featured"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn set_product_hot(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetProductHotRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = seller_service::set_product_hot(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/seller/orders",
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
    tag = "Seller"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<StaffOrderList>>> {
    let resp = seller_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/seller/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Move an order through its lifecycle", body = ApiResponse<Order>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = seller_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
