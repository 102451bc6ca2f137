use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCommentRequest {
    pub rate: i16,
    pub feedback: String,
}

#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct CommentView {
    pub id: Uuid,
    pub account_id: Uuid,
    pub customer_name: String,
    pub rate: i16,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentsResponse {
    pub items: Vec<CommentView>,
    /// 0 when the product has no reviews yet.
    pub average_rate: f64,
}
