use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use password_hash::rand_core::OsRng;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{
        ChangePasswordRequest, LoginRequest, LoginResponse, PortalChangePasswordRequest,
        PortalLoginRequest, RegisterRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_BUYER, SessionClaims, encode_session},
    models::Account,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Account row as stored, hash included. Never serialized.
#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    phone: String,
    password_hash: String,
    role_id: i16,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> Account {
        Account {
            id: self.id,
            phone: self.phone,
            role_id: self.role_id,
            created_at: self.created_at,
        }
    }
}

pub async fn register_account(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Account>> {
    let RegisterRequest {
        phone,
        password,
        confirm_password,
    } = payload;

    validate_phone(&phone)?;
    validate_password(&password)?;
    if password != confirm_password {
        return Err(AppError::BadRequest(
            "Password confirmation does not match".to_string(),
        ));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM accounts WHERE phone = $1")
        .bind(phone.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "Phone number is already registered".to_string(),
        ));
    }

    let password_hash = hash_password(&password)?;
    let account_id = Uuid::new_v4();

    // Account and its empty profile are created together.
    let mut tx = state.pool.begin().await?;
    let account: Account = sqlx::query_as(
        r#"
        INSERT INTO accounts (id, phone, password_hash, role_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, phone, role_id, created_at
        "#,
    )
    .bind(account_id)
    .bind(phone.as_str())
    .bind(password_hash)
    .bind(ROLE_BUYER)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO profiles (id, account_id, phone) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(phone.as_str())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(account.id),
        "account_register",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": account.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Account created", account, None))
}

/// Storefront login; only buyer accounts may use it.
pub async fn login(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let row = find_by_phone(state, &payload.phone).await?;
    let row = match row {
        Some(r) => r,
        None => {
            return Err(AppError::BadRequest(
                "Invalid phone number or password".into(),
            ));
        }
    };

    verify_password(&payload.password, &row.password_hash)?;
    if row.role_id != ROLE_BUYER {
        return Err(AppError::Forbidden);
    }

    issue_session(state, row, "login").await
}

/// Portal login for staff; the account's role must match the requested one.
pub async fn portal_login(
    state: &AppState,
    payload: PortalLoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let row = find_by_phone(state, &payload.phone).await?;
    let row = match row {
        Some(r) => r,
        None => {
            return Err(AppError::BadRequest(
                "Invalid phone number or password".into(),
            ));
        }
    };

    verify_password(&payload.password, &row.password_hash)?;
    if row.role_id != payload.role.role_id() {
        return Err(AppError::Forbidden);
    }

    issue_session(state, row, "portal_login").await
}

/// Portal password reset. Sellers prove the current password; admins the
/// static secret key from config.
pub async fn portal_change_password(
    state: &AppState,
    payload: PortalChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    validate_password(&payload.new_password)?;
    if payload.new_password != payload.confirm_new_password {
        return Err(AppError::BadRequest(
            "Password confirmation does not match".to_string(),
        ));
    }

    let row = find_by_phone(state, &payload.phone).await?;
    let row = match row {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    if row.role_id == ROLE_BUYER {
        return Err(AppError::Forbidden);
    }

    if row.role_id == ROLE_ADMIN {
        let secret = payload.secret_key.unwrap_or_default();
        if secret != state.config.admin_secret_key {
            return Err(AppError::BadRequest("Invalid secret key".to_string()));
        }
    } else {
        let old = payload.old_password.unwrap_or_default();
        verify_password_with_message(&old, &row.password_hash, "Current password is incorrect")?;
    }

    update_password_hash(state, row.id, &payload.new_password).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(row.id),
        "portal_password_change",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": row.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Password updated"))
}

/// Password change for a logged-in buyer.
pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    validate_password(&payload.new_password)?;

    let row: Option<AccountRow> = sqlx::query_as(
        "SELECT id, phone, password_hash, role_id, created_at FROM accounts WHERE id = $1",
    )
    .bind(user.user_id)
    .fetch_optional(&state.pool)
    .await?;
    let row = match row {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    verify_password_with_message(
        &payload.current_password,
        &row.password_hash,
        "Current password is incorrect",
    )?;

    update_password_hash(state, row.id, &payload.new_password).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(row.id),
        "password_change",
        Some("accounts"),
        Some(serde_json::json!({ "account_id": row.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Password updated"))
}

async fn issue_session(
    state: &AppState,
    row: AccountRow,
    action: &str,
) -> AppResult<ApiResponse<LoginResponse>> {
    let claims = SessionClaims {
        user_id: row.id,
        role_id: row.role_id,
    };
    let token = encode_session(&claims)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(row.id),
        action,
        Some("accounts"),
        Some(serde_json::json!({ "account_id": row.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let resp = LoginResponse {
        token,
        account: row.into_account(),
    };
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

async fn find_by_phone(state: &AppState, phone: &str) -> AppResult<Option<AccountRow>> {
    let row: Option<AccountRow> = sqlx::query_as(
        "SELECT id, phone, password_hash, role_id, created_at FROM accounts WHERE phone = $1",
    )
    .bind(phone)
    .fetch_optional(&state.pool)
    .await?;
    Ok(row)
}

async fn update_password_hash(state: &AppState, account_id: Uuid, password: &str) -> AppResult<()> {
    let hash = hash_password(password)?;
    sqlx::query("UPDATE accounts SET password_hash = $2 WHERE id = $1")
        .bind(account_id)
        .bind(hash)
        .execute(&state.pool)
        .await?;
    Ok(())
}

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AppError> {
    verify_password_with_message(password, hash, "Invalid phone number or password")
}

fn verify_password_with_message(password: &str, hash: &str, message: &str) -> Result<(), AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest(message.to_string()));
    }
    Ok(())
}

/// Vietnamese mobile number: a leading zero plus nine digits.
pub(crate) fn validate_phone(phone: &str) -> Result<(), AppError> {
    let valid = phone.len() == 10
        && phone.starts_with('0')
        && phone.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(AppError::BadRequest("Invalid phone number".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 6 {
        return Err(AppError::BadRequest(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}
