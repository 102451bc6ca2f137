use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::{ProductDetail, ProductList},
    error::AppResult,
    models::{Brand, Category},
    response::ApiResponse,
    routes::comments,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
        .route(
            "/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Name search"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("brand_id" = Option<Uuid>, Query, description = "Filter by brand"),
        ("hot" = Option<bool>, Query, description = "Featured products only"),
        ("sort_by" = Option<String>, Query, description = "Sort column: created_at, sell_price, name"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List approved products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product detail with rating and related items", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<Vec<Category>>)
    ),
    tag = "Products"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let resp = product_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/brands",
    responses(
        (status = 200, description = "List brands", body = ApiResponse<Vec<Brand>>)
    ),
    tag = "Products"
)]
pub async fn list_brands(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Brand>>>> {
    let resp = product_service::list_brands(&state).await?;
    Ok(Json(resp))
}
