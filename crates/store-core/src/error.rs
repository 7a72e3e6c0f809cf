//! # Store Error Types
//!
//! Typed error handling for the storefront checkout flow.
//! All catalog and checkout operations return `Result<T, StoreError>`.

use thiserror::Error;

/// Core error type for catalog and checkout operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Item not found in the catalog
    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: u64 },

    /// Order not found
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: u64 },

    /// Discount referenced by an order does not exist
    #[error("Discount not found: {discount_id}")]
    DiscountNotFound { discount_id: u64 },

    /// Tax referenced by an order does not exist
    #[error("Tax not found: {tax_id}")]
    TaxNotFound { tax_id: u64 },

    /// Discount record has neither amount_off nor percent_off
    #[error("Discount {discount_id} has no amount_off or percent_off")]
    InvalidDiscount { discount_id: u64 },

    /// Gateway rejected the session-create call; the message is surfaced
    /// to the caller as a client error
    #[error("{0}")]
    CheckoutRejected(String),

    /// Payment provider API error (coupon / tax-rate / session calls)
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Network/HTTP error communicating with the provider
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Configuration(_) => 500,
            StoreError::InvalidRequest(_) => 400,
            StoreError::ItemNotFound { .. } => 404,
            StoreError::OrderNotFound { .. } => 404,
            StoreError::DiscountNotFound { .. } => 500,
            StoreError::TaxNotFound { .. } => 500,
            StoreError::InvalidDiscount { .. } => 500,
            StoreError::CheckoutRejected(_) => 400,
            StoreError::Provider { .. } => 502,
            StoreError::Network(_) => 503,
            StoreError::Serialization(_) => 500,
            StoreError::Internal(_) => 500,
        }
    }

    /// True for the one failure class the checkout flow converts into a
    /// client error with the gateway's message embedded
    pub fn is_checkout_rejection(&self) -> bool {
        matches!(self, StoreError::CheckoutRejected(_))
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
