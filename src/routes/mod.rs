use axum::{Router, routing::get};

use crate::state::AppState;

pub mod address;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod comments;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod profile;
pub mod seller;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .route("/categories", get(products::list_categories))
        .route("/brands", get(products::list_brands))
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/profile", profile::router())
        .nest("/address", address::router())
        .nest("/admin", admin::router())
        .nest("/seller", seller::router())
}
