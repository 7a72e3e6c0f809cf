//! # store-core
//!
//! Core types and checkout orchestration for storefront-checkout-rs.
//!
//! This crate provides:
//! - `Item`, `Discount`, `Tax`, and `Order` catalog records
//! - `Store` for in-memory record storage with TOML seeding
//! - `PaymentGateway` trait for payment provider implementations
//! - `CheckoutService` for single-item and whole-order checkouts
//! - `StoreError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use store_core::{CheckoutService, CheckoutTarget, RedirectUrls, Store};
//!
//! let store = Arc::new(Store::from_toml(&seed)?);
//! let service = CheckoutService::new(store, gateway);
//!
//! let session = service
//!     .checkout(CheckoutTarget::Order(order_id), urls)
//!     .await?;
//!
//! // Hand session.session_id to the caller for the hosted redirect
//! ```

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod gateway;
pub mod order;
pub mod store;

// Re-exports for convenience
pub use catalog::{Currency, Discount, Item, Tax};
pub use checkout::{CheckoutService, CheckoutTarget, RedirectUrls};
pub use error::{StoreError, StoreResult};
pub use gateway::{CouponSpec, PaymentGateway, SharedGateway, TaxRateSpec};
pub use order::{GatewaySession, Order, SessionLineItem, SessionRequest};
pub use store::{Store, StoreSeed};
