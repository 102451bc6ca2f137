use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use sea_orm::sea_query::Expr;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{
        OrderConfirmation, OrderLine, OrderView, OrderViewList, PaymentMethod, PlaceOrderRequest,
        ShippingInfo, StaffOrderView,
    },
    entity::{
        order_items::{ActiveModel as OrderItemActive, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_buyer},
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::address_service,
    state::AppState,
};

pub const STATUS_PENDING: i16 = 1;
pub const STATUS_PROCESSING: i16 = 2;
pub const STATUS_COMPLETED: i16 = 3;
pub const STATUS_CANCELLED: i16 = 4;

/// Flat shipping tiers in VND.
pub fn shipping_fee(subtotal: i64) -> i64 {
    if subtotal < 100_000 {
        50_000
    } else if subtotal < 200_000 {
        30_000
    } else {
        0
    }
}

pub fn format_shipping_address(street: &str, ward: &str, district: &str, city: &str) -> String {
    format!("{street}, {ward}, {district}, {city}")
}

/// Order timestamps are stored on the Vietnam wall clock (UTC+7).
fn vietnam_now() -> DateTime<FixedOffset> {
    (Utc::now() + Duration::hours(7)).fixed_offset()
}

#[derive(FromRow)]
struct CheckoutLineRow {
    product_id: Uuid,
    quantity: i32,
    sell_price: i64,
    name: String,
}

#[derive(FromRow)]
struct ProfileShippingRow {
    name: String,
    phone: String,
    address: String,
    city: String,
    district: String,
    ward: String,
}

/// Places an order for the selected cart lines.
///
/// Writes run in sequence without a wrapping transaction: order header,
/// order lines, cart cleanup, stock decrements. A failed line insert deletes
/// the header again (the only rollback); a failed stock decrement stops the
/// loop and leaves the order, the cleaned cart and any earlier decrements in
/// place.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderConfirmation>> {
    ensure_buyer(user)?;

    if payload.payment_method == PaymentMethod::Vnpay {
        return Err(AppError::BadRequest(
            "VNPay payment is not yet supported".to_string(),
        ));
    }

    let shipping = match &payload.address {
        Some(addr) => {
            let (city, district) =
                address_service::resolve_city_district(state, addr.city_code, addr.district_code)
                    .await?;
            ShippingInfo {
                name: addr.name.clone(),
                phone: addr.phone.clone(),
                address: format_shipping_address(&addr.street, &addr.ward, &district, &city),
            }
        }
        None => {
            let profile = sqlx::query_as::<_, ProfileShippingRow>(
                "SELECT name, phone, address, city, district, ward FROM profiles WHERE account_id = $1",
            )
            .bind(user.user_id)
            .fetch_optional(&state.pool)
            .await?;
            let profile = match profile {
                Some(p) => p,
                None => return Err(AppError::NotFound),
            };
            if profile.address.is_empty()
                || profile.city.is_empty()
                || profile.district.is_empty()
                || profile.ward.is_empty()
            {
                return Err(AppError::BadRequest(
                    "Shipping address is incomplete. Please update your profile first.".to_string(),
                ));
            }
            ShippingInfo {
                name: profile.name,
                phone: profile.phone,
                address: format_shipping_address(
                    &profile.address,
                    &profile.ward,
                    &profile.district,
                    &profile.city,
                ),
            }
        }
    };

    // Only lines that still resolve to a product participate; stale cart
    // references drop out of the join.
    let lines = sqlx::query_as::<_, CheckoutLineRow>(
        r#"
        SELECT ci.product_id, ci.quantity, p.sell_price, p.name
        FROM cart_items ci
        JOIN carts c ON c.id = ci.cart_id
        JOIN products p ON p.id = ci.product_id
        WHERE c.account_id = $1 AND ci.product_id = ANY($2)
        ORDER BY ci.product_id
        "#,
    )
    .bind(user.user_id)
    .bind(&payload.product_ids)
    .fetch_all(&state.pool)
    .await?;
    if lines.is_empty() {
        return Err(AppError::BadRequest("No cart items selected".to_string()));
    }

    let subtotal: i64 = lines
        .iter()
        .map(|line| line.sell_price * i64::from(line.quantity))
        .sum();
    let fee = shipping_fee(subtotal);

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        account_id: Set(user.user_id),
        total_price: Set(subtotal + fee),
        status: Set(STATUS_PENDING),
        shipping_address: Set(shipping.address.clone()),
        created_at: Set(vietnam_now()),
    }
    .insert(&state.orm)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in &lines {
        let row = OrderItemActive {
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
        };
        match row.insert(&state.orm).await {
            Ok(model) => items.push(order_item_from_entity(model)),
            Err(err) => {
                // Roll the header back; the FK cascade clears any lines
                // already written.
                if let Err(cleanup) = Orders::delete_by_id(order.id).exec(&state.orm).await {
                    tracing::warn!(error = %cleanup, order_id = %order.id, "order rollback failed");
                }
                return Err(AppError::OrmError(err));
            }
        }
    }

    sqlx::query(
        r#"
        DELETE FROM cart_items ci
        USING carts c
        WHERE ci.cart_id = c.id AND c.account_id = $1 AND ci.product_id = ANY($2)
        "#,
    )
    .bind(user.user_id)
    .bind(&payload.product_ids)
    .execute(&state.pool)
    .await?;

    for line in &lines {
        // The filter keeps stock from going negative under concurrent
        // checkouts. A miss halts here; the order and earlier decrements
        // stand.
        let result = Products::update_many()
            .col_expr(
                ProdCol::StockQuantity,
                Expr::col(ProdCol::StockQuantity).sub(line.quantity),
            )
            .filter(
                Condition::all()
                    .add(ProdCol::Id.eq(line.product_id))
                    .add(ProdCol::StockQuantity.gte(line.quantity)),
            )
            .exec(&state.orm)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                line.name
            )));
        }
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_place",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total_price": order.total_price })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderConfirmation {
            order: order_from_entity(order),
            items,
            shipping,
        },
        Some(Meta::empty()),
    ))
}

#[derive(FromRow)]
struct OrderHeaderRow {
    id: Uuid,
    total_price: i64,
    status: i16,
    status_name: String,
    shipping_address: String,
    created_at: DateTime<Utc>,
}

impl OrderHeaderRow {
    fn into_view(self, items: Vec<OrderLine>) -> OrderView {
        OrderView {
            id: self.id,
            total_price: self.total_price,
            status: self.status,
            status_name: self.status_name,
            shipping_address: self.shipping_address,
            created_at: self.created_at,
            items,
        }
    }
}

#[derive(FromRow)]
struct OrderLineRow {
    order_id: Uuid,
    product_id: Uuid,
    name: String,
    sell_price: i64,
    quantity: i32,
    images: Vec<String>,
}

impl OrderLineRow {
    fn into_line(self) -> OrderLine {
        let line_total = self.sell_price * i64::from(self.quantity);
        OrderLine {
            product_id: self.product_id,
            name: self.name,
            sell_price: self.sell_price,
            quantity: self.quantity,
            images: self.images,
            line_total,
        }
    }
}

/// Purchase history for the signed-in buyer, newest first.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderViewList>> {
    ensure_buyer(user)?;

    let headers = sqlx::query_as::<_, OrderHeaderRow>(
        r#"
        SELECT o.id, o.total_price, o.status, os.name AS status_name,
               o.shipping_address, o.created_at
        FROM orders o
        JOIN order_statuses os ON os.id = o.status
        WHERE o.account_id = $1
        ORDER BY o.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
    let mut lines = order_lines(state, &ids).await?;

    let items: Vec<OrderView> = headers
        .into_iter()
        .map(|header| {
            let order_items = lines.remove(&header.id).unwrap_or_default();
            header.into_view(order_items)
        })
        .collect();

    Ok(ApiResponse::success("Orders", OrderViewList { items }, None))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    ensure_buyer(user)?;

    let header = sqlx::query_as::<_, OrderHeaderRow>(
        r#"
        SELECT o.id, o.total_price, o.status, os.name AS status_name,
               o.shipping_address, o.created_at
        FROM orders o
        JOIN order_statuses os ON os.id = o.status
        WHERE o.account_id = $1 AND o.id = $2
        "#,
    )
    .bind(user.user_id)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let header = match header {
        Some(h) => h,
        None => return Err(AppError::NotFound),
    };

    let mut lines = order_lines(state, &[header.id]).await?;
    let order_items = lines.remove(&header.id).unwrap_or_default();

    Ok(ApiResponse::success("Order", header.into_view(order_items), None))
}

#[derive(FromRow)]
struct StaffOrderRow {
    id: Uuid,
    account_id: Uuid,
    customer_name: String,
    customer_phone: String,
    total_price: i64,
    status: i16,
    status_name: String,
    shipping_address: String,
    created_at: DateTime<Utc>,
}

impl StaffOrderRow {
    fn into_view(self, items: Vec<OrderLine>) -> StaffOrderView {
        StaffOrderView {
            id: self.id,
            account_id: self.account_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            total_price: self.total_price,
            status: self.status,
            status_name: self.status_name,
            shipping_address: self.shipping_address,
            created_at: self.created_at,
            items,
        }
    }
}

/// Paginated order listing for the admin and seller dashboards.
pub(crate) async fn staff_order_views(
    state: &AppState,
    query: &OrderListQuery,
) -> AppResult<(Vec<StaffOrderView>, Meta)> {
    let (page, per_page, offset) = query.pagination.normalize();

    let rows = sqlx::query_as::<_, StaffOrderRow>(
        r#"
        SELECT o.id, o.account_id, pr.name AS customer_name, pr.phone AS customer_phone,
               o.total_price, o.status, os.name AS status_name, o.shipping_address, o.created_at
        FROM orders o
        JOIN order_statuses os ON os.id = o.status
        JOIN profiles pr ON pr.account_id = o.account_id
        WHERE ($1::smallint IS NULL OR o.status = $1)
        ORDER BY o.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(query.status)
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders o WHERE ($1::smallint IS NULL OR o.status = $1)")
            .bind(query.status)
            .fetch_one(&state.pool)
            .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut lines = order_lines(state, &ids).await?;

    let views: Vec<StaffOrderView> = rows
        .into_iter()
        .map(|row| {
            let items = lines.remove(&row.id).unwrap_or_default();
            row.into_view(items)
        })
        .collect();

    Ok((views, Meta::new(page, per_page, total.0)))
}

pub(crate) async fn staff_order_view(state: &AppState, id: Uuid) -> AppResult<StaffOrderView> {
    let row = sqlx::query_as::<_, StaffOrderRow>(
        r#"
        SELECT o.id, o.account_id, pr.name AS customer_name, pr.phone AS customer_phone,
               o.total_price, o.status, os.name AS status_name, o.shipping_address, o.created_at
        FROM orders o
        JOIN order_statuses os ON os.id = o.status
        JOIN profiles pr ON pr.account_id = o.account_id
        WHERE o.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?;
    let row = match row {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let mut lines = order_lines(state, &[row.id]).await?;
    let items = lines.remove(&row.id).unwrap_or_default();
    Ok(row.into_view(items))
}

async fn order_lines(
    state: &AppState,
    order_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<OrderLine>>> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, OrderLineRow>(
        r#"
        SELECT oi.order_id, oi.product_id, p.name, p.sell_price, oi.quantity, p.images
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = ANY($1)
        ORDER BY oi.order_id, oi.product_id
        "#,
    )
    .bind(order_ids)
    .fetch_all(&state.pool)
    .await?;

    let mut map: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for row in rows {
        map.entry(row.order_id).or_default().push(row.into_line());
    }
    Ok(map)
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        account_id: model.account_id,
        total_price: model.total_price,
        status: model.status,
        shipping_address: model.shipping_address,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
    }
}
