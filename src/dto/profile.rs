use serde::Deserialize;
use utoipa::ToSchema;

/// Full profile update; city and district come in as lookup codes and are
/// stored as resolved names.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city_code: u32,
    pub district_code: u32,
    pub ward: String,
}
