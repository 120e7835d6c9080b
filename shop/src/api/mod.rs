//! HTTP surface: per-operation handlers and the router. Each handler
//! deserializes its own request type, resolves the authenticated principal
//! and delegates to the storage traits.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod wishlist;

use crate::storage::{CartStorage, CatalogStorage, IdentityStorage, OrderStorage, WishlistStorage};
use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub cart: Arc<dyn CartStorage>,
    pub orders: Arc<dyn OrderStorage>,
    pub catalog: Arc<dyn CatalogStorage>,
    pub identity: Arc<dyn IdentityStorage>,
    pub wishlist: Arc<dyn WishlistStorage>,
}

impl AppState {
    pub fn new(
        cart: Arc<dyn CartStorage>,
        orders: Arc<dyn OrderStorage>,
        catalog: Arc<dyn CatalogStorage>,
        identity: Arc<dyn IdentityStorage>,
        wishlist: Arc<dyn WishlistStorage>,
    ) -> Self {
        Self { cart, orders, catalog, identity, wishlist }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/cart/", get(cart::list))
        .route("/cart/add", post(cart::add))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/increase", patch(cart::increase))
        .route("/cart/decrease", patch(cart::decrease))
        .route("/cart/update_quantity", patch(cart::update_quantity))
        .route("/cart/clear_cart", delete(cart::clear_cart))
        .route("/orders/", post(orders::place).get(orders::list))
        .route("/orders/active/", get(orders::active))
        .route("/orders/{id}/", get(orders::retrieve))
        .route("/orders/{id}/cancel/", patch(orders::cancel))
        .route("/orders/{id}/status/", patch(orders::set_status))
        .route(
            "/products/",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/products/{id}/",
            get(catalog::get_product)
                .patch(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/products/{id}/reviews/",
            get(catalog::list_reviews).post(catalog::create_review),
        )
        .route("/reviews/mine/", get(catalog::my_reviews))
        .route(
            "/categories/",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route("/categories/{id}/", delete(catalog::delete_category))
        .route("/wishlist/", get(wishlist::list).post(wishlist::add))
        .route("/wishlist/{product_id}/", delete(wishlist::remove))
        .with_state(state)
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}
