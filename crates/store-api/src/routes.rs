//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET /item/{item_id}       - Item detail page
/// - GET /buy/{item_id}        - Create checkout session for one item
/// - GET /order/{order_id}     - Order detail page
/// - GET /buy_order/{order_id} - Create checkout session for an order
/// - GET /success              - Post-payment success page
/// - GET /health               - Health check
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/item/{item_id}", get(handlers::item_detail))
        .route("/buy/{item_id}", get(handlers::buy_item))
        .route("/order/{order_id}", get(handlers::order_detail))
        .route("/buy_order/{order_id}", get(handlers::buy_order))
        .route("/success", get(handlers::checkout_success))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
