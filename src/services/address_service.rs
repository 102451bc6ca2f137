//! Client for the public Vietnamese administrative-units API. Provinces,
//! districts and wards are never persisted locally; every lookup goes
//! upstream.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{
    dto::address::{District, Province, Ward},
    error::{AppError, AppResult},
    response::ApiResponse,
    state::AppState,
};

#[derive(Deserialize)]
struct ProvinceDetail {
    name: String,
    #[serde(default)]
    districts: Vec<District>,
}

#[derive(Deserialize)]
struct DistrictDetail {
    #[serde(default)]
    wards: Vec<Ward>,
}

async fn fetch_json<T: DeserializeOwned>(url: &str) -> AppResult<T> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|err| AppError::Upstream(err.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| AppError::Upstream(err.to_string()))?;

    match response.status() {
        reqwest::StatusCode::OK => response
            .json::<T>()
            .await
            .map_err(|err| AppError::Upstream(err.to_string())),
        reqwest::StatusCode::NOT_FOUND => Err(AppError::NotFound),
        status => Err(AppError::Upstream(format!(
            "address service returned {status}"
        ))),
    }
}

pub async fn list_provinces(state: &AppState) -> AppResult<ApiResponse<Vec<Province>>> {
    let url = format!("{}/p/", state.config.provinces_api_base);
    let provinces: Vec<Province> = fetch_json(&url).await?;
    Ok(ApiResponse::success("Provinces", provinces, None))
}

pub async fn list_districts(
    state: &AppState,
    province_code: u32,
) -> AppResult<ApiResponse<Vec<District>>> {
    let url = format!(
        "{}/p/{}?depth=2",
        state.config.provinces_api_base, province_code
    );
    let detail: ProvinceDetail = fetch_json(&url).await?;
    Ok(ApiResponse::success("Districts", detail.districts, None))
}

pub async fn list_wards(
    state: &AppState,
    district_code: u32,
) -> AppResult<ApiResponse<Vec<Ward>>> {
    let url = format!(
        "{}/d/{}?depth=2",
        state.config.provinces_api_base, district_code
    );
    let detail: DistrictDetail = fetch_json(&url).await?;
    Ok(ApiResponse::success("Wards", detail.wards, None))
}

/// Resolves checkout city/district codes to their display names. Unknown
/// codes surface as a 400 so the storefront can re-prompt the form.
pub(crate) async fn resolve_city_district(
    state: &AppState,
    city_code: u32,
    district_code: u32,
) -> AppResult<(String, String)> {
    let url = format!("{}/p/{}?depth=2", state.config.provinces_api_base, city_code);
    let province: ProvinceDetail = match fetch_json(&url).await {
        Ok(detail) => detail,
        Err(AppError::NotFound) => {
            return Err(AppError::BadRequest("Invalid city code".to_string()));
        }
        Err(err) => return Err(err),
    };

    let district_name = province
        .districts
        .iter()
        .find(|d| d.code == district_code)
        .map(|d| d.name.clone())
        .ok_or_else(|| AppError::BadRequest("Invalid district code".to_string()))?;

    Ok((province.name, district_name))
}
