use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

/// Detail view: the product itself, its review average, and a shelf of
/// approved products from the same category.
#[derive(Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub average_rate: f64,
    pub related: Vec<Product>,
}

/// Product row for the admin/seller dashboards, with lookup names joined in.
#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct StaffProductRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub import_price: i64,
    pub sell_price: i64,
    pub stock_quantity: i32,
    pub is_hot: bool,
    pub status: i16,
    pub status_name: String,
    pub category_name: String,
    pub brand_name: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct StaffProductList {
    #[schema(value_type = Vec<StaffProductRow>)]
    pub items: Vec<StaffProductRow>,
}
