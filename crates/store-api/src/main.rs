//! # Storefront Checkout
//!
//! E-commerce checkout facade over a hosted payment gateway.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//!
//! # Run the server
//! storefront-checkout
//! ```

use store_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Store loaded: {} items, {} orders",
        state.store.item_count(),
        state.store.order_count()
    );

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("Storefront checkout starting on http://{}", addr);

    if !is_prod {
        info!("Item page: http://{}/item/1", addr);
        info!("Checkout: GET http://{}/buy/1", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
