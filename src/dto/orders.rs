use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Vnpay,
}

/// Address entered on the checkout form; city and district arrive as lookup
/// codes and are resolved to names before anything is stored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NewAddress {
    pub name: String,
    pub phone: String,
    pub street: String,
    pub city_code: u32,
    pub district_code: u32,
    pub ward: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    /// Cart lines to purchase, by product id.
    pub product_ids: Vec<Uuid>,
    pub payment_method: PaymentMethod,
    /// `None` means ship to the stored profile address.
    pub address: Option<NewAddress>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShippingInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Payload the storefront shows on the order-confirmation page.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderConfirmation {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub shipping: ShippingInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub name: String,
    pub sell_price: i64,
    pub quantity: i32,
    pub images: Vec<String>,
    pub line_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderView {
    pub id: Uuid,
    pub total_price: i64,
    pub status: i16,
    pub status_name: String,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLine>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderViewList {
    #[schema(value_type = Vec<OrderView>)]
    pub items: Vec<OrderView>,
}

/// Order row for the admin/seller dashboards, with the customer joined in.
#[derive(Debug, Serialize, ToSchema)]
pub struct StaffOrderView {
    pub id: Uuid,
    pub account_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub total_price: i64,
    pub status: i16,
    pub status_name: String,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderLine>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct StaffOrderList {
    #[schema(value_type = Vec<StaffOrderView>)]
    pub items: Vec<StaffOrderView>,
}
