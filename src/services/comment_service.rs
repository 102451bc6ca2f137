use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::comments::{AddCommentRequest, CommentView, CommentsResponse},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_buyer},
    response::ApiResponse,
    state::AppState,
};

pub async fn list_comments(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<CommentsResponse>> {
    let items = sqlx::query_as::<_, CommentView>(
        r#"
        SELECT cm.id, cm.account_id, pr.name AS customer_name, cm.rate, cm.feedback, cm.created_at
        FROM comments cm
        JOIN profiles pr ON pr.account_id = cm.account_id
        WHERE cm.product_id = $1
        ORDER BY cm.created_at DESC
        "#,
    )
    .bind(product_id)
    .fetch_all(&state.pool)
    .await?;

    let average: (f64,) =
        sqlx::query_as("SELECT COALESCE(AVG(rate)::float8, 0) FROM comments WHERE product_id = $1")
            .bind(product_id)
            .fetch_one(&state.pool)
            .await?;

    Ok(ApiResponse::success(
        "Comments",
        CommentsResponse {
            items,
            average_rate: average.0,
        },
        None,
    ))
}

/// One review per buyer per product; the unique index backs this up.
pub async fn add_comment(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: AddCommentRequest,
) -> AppResult<ApiResponse<CommentView>> {
    ensure_buyer(user)?;
    if !(1..=5).contains(&payload.rate) {
        return Err(AppError::BadRequest(
            "Rate must be between 1 and 5".to_string(),
        ));
    }

    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM comments WHERE product_id = $1 AND account_id = $2")
            .bind(product_id)
            .bind(user.user_id)
            .fetch_optional(&state.pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(
            "You have already reviewed this product".to_string(),
        ));
    }

    let inserted: (Uuid, DateTime<Utc>) = sqlx::query_as(
        r#"
        INSERT INTO comments (id, product_id, account_id, rate, feedback)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(user.user_id)
    .bind(payload.rate)
    .bind(&payload.feedback)
    .fetch_one(&state.pool)
    .await?;

    let customer: (String,) = sqlx::query_as("SELECT name FROM profiles WHERE account_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "comment_add",
        Some("comments"),
        Some(serde_json::json!({ "product_id": product_id, "rate": payload.rate })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Review added",
        CommentView {
            id: inserted.0,
            account_id: user.user_id,
            customer_name: customer.0,
            rate: payload.rate,
            feedback: payload.feedback,
            created_at: inserted.1,
        },
        None,
    ))
}
