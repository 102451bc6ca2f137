use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Account as exposed over the wire; the password hash never leaves the DB
/// layer.
#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub phone: String,
    pub role_id: i16,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub ward: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub import_price: i64,
    pub sell_price: i64,
    pub stock_quantity: i32,
    pub category_id: Uuid,
    pub brand_id: Uuid,
    pub is_hot: bool,
    pub status: i16,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub account_id: Uuid,
    pub total_price: i64,
    pub status: i16,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub product_id: Uuid,
    pub account_id: Uuid,
    pub rate: i16,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}
