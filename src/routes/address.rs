use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::address::{District, Province, Ward},
    error::AppResult,
    response::ApiResponse,
    services::address_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/provinces", get(list_provinces))
        .route("/provinces/{code}/districts", get(list_districts))
        .route("/districts/{code}/wards", get(list_wards))
}

#[utoipa::path(
    get,
    path = "/api/address/provinces",
    responses(
        (status = 200, description = "All provinces", body = ApiResponse<Vec<Province>>),
        (status = 502, description = "Address service unavailable"),
    ),
    tag = "Address"
)]
pub async fn list_provinces(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Province>>>> {
    let resp = address_service::list_provinces(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/address/provinces/{code}/districts",
    params(
        ("code" = u32, Path, description = "Province code")
    ),
    responses(
        (status = 200, description = "Districts of a province", body = ApiResponse<Vec<District>>),
        (status = 404, description = "Unknown province"),
        (status = 502, description = "Address service unavailable"),
    ),
    tag = "Address"
)]
pub async fn list_districts(
    State(state): State<AppState>,
    Path(code): Path<u32>,
) -> AppResult<Json<ApiResponse<Vec<District>>>> {
    let resp = address_service::list_districts(&state, code).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/address/districts/{code}/wards",
    params(
        ("code" = u32, Path, description = "District code")
    ),
    responses(
        (status = 200, description = "Wards of a district", body = ApiResponse<Vec<Ward>>),
        (status = 404, description = "Unknown district"),
        (status = 502, description = "Address service unavailable"),
    ),
    tag = "Address"
)]
pub async fn list_wards(
    State(state): State<AppState>,
    Path(code): Path<u32>,
) -> AppResult<Json<ApiResponse<Vec<Ward>>>> {
    let resp = address_service::list_wards(&state, code).await?;
    Ok(Json(resp))
}
