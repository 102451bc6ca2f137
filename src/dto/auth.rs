use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::middleware::auth::{ROLE_ADMIN, ROLE_SELLER};
use crate::models::Account;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PortalRole {
    Admin,
    Seller,
}

impl PortalRole {
    pub fn role_id(self) -> i16 {
        match self {
            PortalRole::Admin => ROLE_ADMIN,
            PortalRole::Seller => ROLE_SELLER,
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct PortalLoginRequest {
    pub phone: String,
    pub password: String,
    pub role: PortalRole,
}

/// Portal password reset: sellers prove the current password, admins the
/// static secret key.
#[derive(Deserialize, Debug, ToSchema)]
pub struct PortalChangePasswordRequest {
    pub phone: String,
    pub old_password: Option<String>,
    pub new_password: String,
    pub confirm_new_password: String,
    pub secret_key: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub account: Account,
}
