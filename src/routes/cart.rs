use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddCartItemRequest, CartLine, CartView, RemoveCartItemsRequest, SetCartItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart))
        .route("/items", post(add_item).delete(remove_items))
        .route("/items/{product_id}", put(set_item).delete(remove_item))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart lines with live product data", body = ApiResponse<CartView>)
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::view_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Add to cart, quantity capped at stock", body = ApiResponse<CartLine>),
        (status = 400, description = "Product unavailable or out of stock"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartLine>>> {
    let resp = cart_service::add_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cart/items/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = SetCartItemRequest,
    responses(
        (status = 200, description = "Set line quantity", body = ApiResponse<CartLine>),
        (status = 404, description = "Line not in cart"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn set_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<SetCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartLine>>> {
    let resp = cart_service::set_item(&state, &user, product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Remove one line", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Line not in cart"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::remove_item(&state, &user, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items",
    request_body = RemoveCartItemsRequest,
    responses(
        (status = 200, description = "Remove several lines at once", body = ApiResponse<serde_json::Value>)
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_items(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RemoveCartItemsRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::remove_items(&state, &user, payload).await?;
    Ok(Json(resp))
}
