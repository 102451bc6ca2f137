use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

pub const ROLE_BUYER: i16 = 1;
pub const ROLE_ADMIN: i16 = 2;
pub const ROLE_SELLER: i16 = 3;

/// Name of the session cookie set at login.
pub const SESSION_COOKIE: &str = "token";

/// What the session blob carries. The wire format is base64 over compact
/// JSON; the blob is not signed, so every protected route re-checks the
/// role against this decoded value rather than trusting the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub role_id: i16,
}

pub fn encode_session(claims: &SessionClaims) -> Result<String, AppError> {
    let json = serde_json::to_vec(claims)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
    Ok(STANDARD.encode(json))
}

pub fn decode_session(token: &str) -> Result<SessionClaims, AppError> {
    let bytes = STANDARD.decode(token).map_err(|_| AppError::Unauthorized)?;
    serde_json::from_slice(&bytes).map_err(|_| AppError::Unauthorized)
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role_id: i16,
}

pub fn ensure_role(user: &AuthUser, role_id: i16) -> Result<(), AppError> {
    if user.role_id != role_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_buyer(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_BUYER)
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_ADMIN)
}

pub fn ensure_seller(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ROLE_SELLER)
}

/// Session cookie first; `Authorization: Bearer` is the fallback for
/// API clients that do not carry cookies.
fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for part in cookies.split(';') {
            let value = part
                .trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='));
            if let Some(value) = value {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = decode_session(&token)?;

        Ok(AuthUser {
            user_id: claims.user_id,
            role_id: claims.role_id,
        })
    }
}
