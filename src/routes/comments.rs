use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    dto::comments::{AddCommentRequest, CommentView, CommentsResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::comment_service,
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/products/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product reviews with average rating", body = ApiResponse<CommentsResponse>)
    ),
    tag = "Comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CommentsResponse>>> {
    let resp = comment_service::list_comments(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = AddCommentRequest,
    responses(
        (status = 200, description = "Add a review", body = ApiResponse<CommentView>),
        (status = 400, description = "Invalid rating or already reviewed"),
        (status = 404, description = "Product not found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Comments"
)]
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddCommentRequest>,
) -> AppResult<Json<ApiResponse<CommentView>>> {
    let resp = comment_service::add_comment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
