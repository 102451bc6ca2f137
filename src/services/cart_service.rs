use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddCartItemRequest, CartLine, CartView, RemoveCartItemsRequest, SetCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_buyer},
    response::{ApiResponse, Meta},
    services::product_service::STATUS_APPROVED,
    state::AppState,
};

#[derive(FromRow)]
struct CartLineRow {
    product_id: Uuid,
    quantity: i32,
    name: String,
    sell_price: i64,
    stock_quantity: i32,
    images: Vec<String>,
}

impl CartLineRow {
    fn into_line(self) -> CartLine {
        let line_total = self.sell_price * i64::from(self.quantity);
        CartLine {
            product_id: self.product_id,
            name: self.name,
            sell_price: self.sell_price,
            quantity: self.quantity,
            stock_quantity: self.stock_quantity,
            images: self.images,
            line_total,
        }
    }
}

/// The cart row is created on first access rather than at registration.
pub(crate) async fn ensure_cart(state: &AppState, account_id: Uuid) -> AppResult<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO carts (id, account_id)
        VALUES ($1, $2)
        ON CONFLICT (account_id) DO UPDATE SET account_id = EXCLUDED.account_id
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(account_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(row.0)
}

pub async fn view_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    ensure_buyer(user)?;
    let cart_id = ensure_cart(state, user.user_id).await?;

    let rows = sqlx::query_as::<_, CartLineRow>(
        r#"
        SELECT ci.product_id, ci.quantity, p.name, p.sell_price, p.stock_quantity, p.images
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.product_id
        "#,
    )
    .bind(cart_id)
    .fetch_all(&state.pool)
    .await?;

    let items: Vec<CartLine> = rows.into_iter().map(CartLineRow::into_line).collect();
    let total = items.iter().map(|line| line.line_total).sum();

    Ok(ApiResponse::success("Cart", CartView { items, total }, None))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartLine>> {
    ensure_buyer(user)?;
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    let product: Option<(i16, i32)> =
        sqlx::query_as("SELECT status, stock_quantity FROM products WHERE id = $1")
            .bind(payload.product_id)
            .fetch_optional(&state.pool)
            .await?;
    let (status, stock) = match product {
        Some(p) => p,
        None => return Err(AppError::BadRequest("Product not found".to_string())),
    };
    if status != STATUS_APPROVED {
        return Err(AppError::BadRequest("Product is not available".to_string()));
    }
    if stock <= 0 {
        return Err(AppError::BadRequest("Product is out of stock".to_string()));
    }

    let cart_id = ensure_cart(state, user.user_id).await?;

    let current: Option<(i32,)> =
        sqlx::query_as("SELECT quantity FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(payload.product_id)
            .fetch_optional(&state.pool)
            .await?;

    // Repeated adds accumulate, capped at what is actually in stock.
    let requested = current.map_or(payload.quantity, |(q,)| q + payload.quantity);
    let quantity = requested.min(stock);

    sqlx::query(
        r#"
        INSERT INTO cart_items (cart_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
        "#,
    )
    .bind(cart_id)
    .bind(payload.product_id)
    .bind(quantity)
    .execute(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": payload.product_id, "quantity": quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let line = fetch_line(state, cart_id, payload.product_id).await?;
    let line = match line {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Added to cart", line, None))
}

/// Replaces the line quantity outright; the cart page spinner does not clamp.
pub async fn set_item(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: SetCartItemRequest,
) -> AppResult<ApiResponse<CartLine>> {
    ensure_buyer(user)?;
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    let cart_id = ensure_cart(state, user.user_id).await?;

    let result = sqlx::query("UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND product_id = $2")
        .bind(cart_id)
        .bind(product_id)
        .bind(payload.quantity)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let line = fetch_line(state, cart_id, product_id).await?;
    let line = match line {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Cart updated", line, None))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_buyer(user)?;
    let cart_id = ensure_cart(state, user.user_id).await?;

    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
        .bind(cart_id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::acknowledged("Removed from cart"))
}

/// Bulk removal used when purchasing a selection.
pub async fn remove_items(
    state: &AppState,
    user: &AuthUser,
    payload: RemoveCartItemsRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_buyer(user)?;
    let cart_id = ensure_cart(state, user.user_id).await?;

    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = ANY($2)")
        .bind(cart_id)
        .bind(&payload.product_ids)
        .execute(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "product_ids": payload.product_ids })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({ "removed": result.rows_affected() }),
        Some(Meta::empty()),
    ))
}

async fn fetch_line(
    state: &AppState,
    cart_id: Uuid,
    product_id: Uuid,
) -> AppResult<Option<CartLine>> {
    let row = sqlx::query_as::<_, CartLineRow>(
        r#"
        SELECT ci.product_id, ci.quantity, p.name, p.sell_price, p.stock_quantity, p.images
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1 AND ci.product_id = $2
        "#,
    )
    .bind(cart_id)
    .bind(product_id)
    .fetch_optional(&state.pool)
    .await?;
    Ok(row.map(CartLineRow::into_line))
}
