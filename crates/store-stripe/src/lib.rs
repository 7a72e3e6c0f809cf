//! # store-stripe
//!
//! Stripe gateway for storefront-checkout-rs.
//!
//! Implements the `PaymentGateway` trait from `store-core` over the
//! form-encoded Stripe REST API:
//!
//! - `POST /v1/checkout/sessions` — hosted payment-mode checkout
//! - `POST /v1/coupons` — one-shot coupons materialized from Discount records
//! - `POST /v1/tax_rates` — tax rates materialized from Tax records
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use store_stripe::StripeGateway;
//! use store_core::PaymentGateway;
//!
//! // Reads STRIPE_SECRET_KEY / STRIPE_PUBLISHABLE_KEY
//! let gateway = StripeGateway::from_env()?;
//!
//! let session = gateway.create_checkout_session(&request).await?;
//! // Redirect the customer to session.checkout_url
//! ```

pub mod config;
pub mod gateway;

// Re-exports
pub use config::StripeConfig;
pub use gateway::StripeGateway;
