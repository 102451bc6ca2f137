use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, header::SET_COOKIE},
    routing::post,
};

use crate::{
    dto::auth::{
        ChangePasswordRequest, LoginRequest, LoginResponse, PortalChangePasswordRequest,
        PortalLoginRequest, RegisterRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, SESSION_COOKIE},
    models::Account,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/change-password", post(change_password))
        .route("/portal/login", post(portal_login))
        .route("/portal/change-password", post(portal_change_password))
}

fn session_headers(token: &str) -> AppResult<HeaderMap> {
    let cookie = format!("{SESSION_COOKIE}={token}; Max-Age=3600; Path=/; SameSite=Strict; HttpOnly");
    let value = HeaderValue::from_str(&cookie)
        .map_err(|err| AppError::Internal(anyhow::anyhow!(err.to_string())))?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value);
    Ok(headers)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register customer account", body = ApiResponse<Account>),
        (status = 400, description = "Invalid phone or password"),
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = auth_service::register_account(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Customer login, sets the session cookie", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials"),
        (status = 403, description = "Not a customer account"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(HeaderMap, Json<ApiResponse<LoginResponse>>)> {
    let resp = auth_service::login(&state, payload).await?;
    let token = resp
        .data
        .as_ref()
        .map(|data| data.token.clone())
        .unwrap_or_default();
    Ok((session_headers(&token)?, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Change own password", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Current password incorrect"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::change_password(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/portal/login",
    request_body = PortalLoginRequest,
    responses(
        (status = 200, description = "Staff login for the selected portal role", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials"),
        (status = 403, description = "Role mismatch"),
    ),
    tag = "Auth"
)]
pub async fn portal_login(
    State(state): State<AppState>,
    Json(payload): Json<PortalLoginRequest>,
) -> AppResult<(HeaderMap, Json<ApiResponse<LoginResponse>>)> {
    let resp = auth_service::portal_login(&state, payload).await?;
    let token = resp
        .data
        .as_ref()
        .map(|data| data.token.clone())
        .unwrap_or_default();
    Ok((session_headers(&token)?, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/portal/change-password",
    request_body = PortalChangePasswordRequest,
    responses(
        (status = 200, description = "Staff password reset; admins use the secret key instead of the old password", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid secret key or old password"),
        (status = 403, description = "Customer accounts cannot use the portal"),
        (status = 404, description = "Account not found"),
    ),
    tag = "Auth"
)]
pub async fn portal_change_password(
    State(state): State<AppState>,
    Json(payload): Json<PortalChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::portal_change_password(&state, payload).await?;
    Ok(Json(resp))
}
