use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::products::{ProductDetail, ProductList, StaffProductRow},
    entity::products::{Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::{Brand, Category, Product},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder, StaffProductQuery},
    state::AppState,
};

pub const STATUS_PENDING: i16 = 1;
pub const STATUS_APPROVED: i16 = 2;
pub const STATUS_REJECTED: i16 = 3;

/// Dashboard alert threshold: products below this stock level need restocking.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Public catalog. Only approved products are visible here.
pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(Column::Status.eq(STATUS_APPROVED));

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col(Column::Name).ilike(pattern));
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    if let Some(brand_id) = query.brand_id {
        condition = condition.add(Column::BrandId.eq(brand_id));
    }

    if query.hot.unwrap_or(false) {
        condition = condition.add(Column::IsHot.eq(true));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::SellPrice => Column::SellPrice,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

/// Detail view, reachable for any status so staff previews work; buyers only
/// ever navigate here from approved listings.
pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let model = Products::find_by_id(id).one(&state.orm).await?;
    let model = match model {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let (average_rate,): (f64,) =
        sqlx::query_as("SELECT COALESCE(AVG(rate)::float8, 0) FROM comments WHERE product_id = $1")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;

    let related = Products::find()
        .filter(
            Condition::all()
                .add(Column::CategoryId.eq(model.category_id))
                .add(Column::Status.eq(STATUS_APPROVED))
                .add(Column::Id.ne(id)),
        )
        .order_by_desc(Column::CreatedAt)
        .limit(4)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let data = ProductDetail {
        product: product_from_entity(model),
        average_rate,
        related,
    };
    Ok(ApiResponse::success("Product", data, None))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<Vec<Category>>> {
    let items: Vec<Category> = sqlx::query_as("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(ApiResponse::success("Categories", items, None))
}

pub async fn list_brands(state: &AppState) -> AppResult<ApiResponse<Vec<Brand>>> {
    let items: Vec<Brand> = sqlx::query_as("SELECT id, name FROM brands ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(ApiResponse::success("Brands", items, None))
}

/// Product rows for the admin and seller dashboards: any status, lookup
/// names joined in, optional name search and low-stock filter.
pub(crate) async fn staff_product_rows(
    state: &AppState,
    query: &StaffProductQuery,
) -> AppResult<(Vec<StaffProductRow>, Meta)> {
    let (page, limit, offset) = query.pagination.normalize();
    let search = query.q.clone().unwrap_or_default();
    let low_stock = query.low_stock.unwrap_or(false);

    let rows = sqlx::query_as::<_, StaffProductRow>(
        r#"
        SELECT p.id, p.code, p.name, p.import_price, p.sell_price, p.stock_quantity,
               p.is_hot, p.status, s.name AS status_name, c.name AS category_name,
               b.name AS brand_name, p.images, p.created_at
        FROM products p
        JOIN product_statuses s ON s.id = p.status
        JOIN categories c ON c.id = p.category_id
        JOIN brands b ON b.id = p.brand_id
        WHERE ($1 = '' OR p.name ILIKE '%' || $1 || '%')
          AND (NOT $2 OR p.stock_quantity < $3)
        ORDER BY p.created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(search.as_str())
    .bind(low_stock)
    .bind(LOW_STOCK_THRESHOLD)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM products p
        WHERE ($1 = '' OR p.name ILIKE '%' || $1 || '%')
          AND (NOT $2 OR p.stock_quantity < $3)
        "#,
    )
    .bind(search.as_str())
    .bind(low_stock)
    .bind(LOW_STOCK_THRESHOLD)
    .fetch_one(&state.pool)
    .await?;

    Ok((rows, Meta::new(page, limit, total.0)))
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        code: model.code,
        name: model.name,
        description: model.description,
        import_price: model.import_price,
        sell_price: model.sell_price,
        stock_quantity: model.stock_quantity,
        category_id: model.category_id,
        brand_id: model.brand_id,
        is_hot: model.is_hot,
        status: model.status,
        images: model.images,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
