//! # store-api
//!
//! HTTP API layer for storefront-checkout-rs.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/item/{item_id}` | Item detail page |
//! | GET | `/buy/{item_id}` | Checkout session for one item |
//! | GET | `/order/{order_id}` | Order detail page |
//! | GET | `/buy_order/{order_id}` | Checkout session for an order |
//! | GET | `/success` | Post-payment success page |
//! | GET | `/health` | Health check |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
