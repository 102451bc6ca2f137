use crate::{
    audit::log_audit,
    dto::profile::UpdateProfileRequest,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Profile,
    response::ApiResponse,
    services::address_service,
    state::AppState,
};

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        "SELECT id, account_id, name, email, phone, address, city, district, ward, created_at FROM profiles WHERE account_id = $1",
    )
    .bind(user.user_id)
    .fetch_optional(&state.pool)
    .await?;

    match profile {
        Some(profile) => Ok(ApiResponse::success("Profile", profile, None)),
        None => Err(AppError::NotFound),
    }
}

/// City and district arrive as lookup codes and are stored as resolved names,
/// same as the checkout form.
pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Profile>> {
    let (city, district) =
        address_service::resolve_city_district(state, payload.city_code, payload.district_code)
            .await?;

    let profile = sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles
        SET name = $2, email = $3, phone = $4, address = $5, city = $6, district = $7, ward = $8
        WHERE account_id = $1
        RETURNING id, account_id, name, email, phone, address, city, district, ward, created_at
        "#,
    )
    .bind(user.user_id)
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(&city)
    .bind(&district)
    .bind(&payload.ward)
    .fetch_optional(&state.pool)
    .await?;
    let profile = match profile {
        Some(profile) => profile,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "profile_update",
        Some("profiles"),
        Some(serde_json::json!({ "profile_id": profile.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Profile updated", profile, None))
}
