//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health             - Health check
//!
//! # Orders
//! POST /orders             - Place an order (merges into the open window order)
//! GET  /orders             - Orders for the caller (bearer key) or ?email=
//! GET  /orders/all         - Every order, member and guest
//!
//! # Products
//! GET    /products         - Catalog listing
//! GET    /products/{id}    - Product detail
//! POST   /products         - Add a product
//! PUT    /products/{id}    - Replace a product
//! DELETE /products/{id}    - Remove a product
//!
//! # Members
//! POST /members/join       - Register (issues an API key)
//! POST /members/login      - Login with email + password
//! GET  /members/me         - Profile for the bearer key
//! PUT  /members/me         - Partial profile update
//! ```

pub mod members;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/all", get(orders::list_all))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the member routes router.
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/join", post(members::join))
        .route("/login", post(members::login))
        .route("/me", get(members::me).put(members::update_me))
}

/// Create all routes for the backend.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/orders", order_routes())
        .nest("/products", product_routes())
        .nest("/members", member_routes())
}
