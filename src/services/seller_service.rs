use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::StaffOrderList,
    dto::products::StaffProductList,
    entity::{
        orders::{ActiveModel as OrderActive, Entity as Orders},
        products::{ActiveModel as ProductActive, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_seller},
    models::{Order, Product},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, StaffProductQuery},
    routes::seller::{SetProductHotRequest, SetProductStatusRequest, UpdateOrderStatusRequest},
    services::{order_service, product_service},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: StaffProductQuery,
) -> AppResult<ApiResponse<StaffProductList>> {
    ensure_seller(user)?;
    let (items, meta) = product_service::staff_product_rows(state, &query).await?;
    Ok(ApiResponse::success(
        "Products",
        StaffProductList { items },
        Some(meta),
    ))
}

pub async fn set_product_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: SetProductStatusRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let valid: Option<(i16,)> = sqlx::query_as("SELECT id FROM product_statuses WHERE id = $1")
        .bind(payload.status)
        .fetch_optional(&state.pool)
        .await?;
    if valid.is_none() {
        return Err(AppError::BadRequest(
            "Invalid product status".to_string(),
        ));
    }

    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ProductActive = existing.into();
    active.status = Set(payload.status);
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_status_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": updated.id, "status": updated.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product status updated",
        product_service::product_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn set_product_hot(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: SetProductHotRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_seller(user)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    if payload.is_hot && existing.status != product_service::STATUS_APPROVED {
        return Err(AppError::BadRequest(
            "Only approved products can be featured".to_string(),
        ));
    }

    let mut active: ProductActive = existing.into();
    active.is_hot = Set(payload.is_hot);
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_hot_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": updated.id, "is_hot": updated.is_hot })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product updated",
        product_service::product_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<StaffOrderList>> {
    ensure_seller(user)?;
    let (items, meta) = order_service::staff_order_views(state, &query).await?;
    Ok(ApiResponse::success(
        "Orders",
        StaffOrderList { items },
        Some(meta),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_seller(user)?;
    let valid: Option<(i16,)> = sqlx::query_as("SELECT id FROM order_statuses WHERE id = $1")
        .bind(payload.status)
        .fetch_optional(&state.pool)
        .await?;
    if valid.is_none() {
        return Err(AppError::BadRequest("Invalid order status".to_string()));
    }

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": updated.id, "status": updated.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_service::order_from_entity(updated),
        Some(Meta::empty()),
    ))
}
