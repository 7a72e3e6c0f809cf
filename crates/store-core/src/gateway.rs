//! # Payment Gateway Trait
//!
//! Seam between the checkout flow and the payment provider. The provider
//! exposes three remote operations, each returning an object with an opaque
//! id; everything else about the hosted checkout is the provider's concern.

use crate::catalog::Currency;
use crate::error::StoreResult;
use crate::order::{GatewaySession, SessionRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Specification for a gateway-side coupon.
///
/// Coupons are single-use ("once" duration) and carry either a fixed amount
/// in a concrete currency or a percentage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponSpec {
    /// Fixed amount off, in the currency of the order's first item
    AmountOff { amount: u64, currency: Currency },
    /// Percentage off
    PercentOff { percent: u64 },
}

/// Specification for a gateway-side tax rate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxRateSpec {
    /// Name shown on the hosted checkout page
    pub display_name: String,
    /// Tax percentage
    pub percentage: u64,
    /// Whether the tax is included in item prices
    pub inclusive: bool,
}

/// Core trait for payment provider implementations.
///
/// The checkout service treats all three operations as opaque remote calls;
/// providers translate them into their own API requests.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment-mode checkout session and return its id and
    /// hosted-page URL.
    async fn create_checkout_session(
        &self,
        request: &SessionRequest,
    ) -> StoreResult<GatewaySession>;

    /// Create a coupon and return its remote id.
    async fn create_coupon(&self, spec: &CouponSpec) -> StoreResult<String>;

    /// Create a tax rate and return its remote id.
    async fn create_tax_rate(&self, spec: &TaxRateSpec) -> StoreResult<String>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type SharedGateway = Arc<dyn PaymentGateway>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupon_spec_variants() {
        let amount = CouponSpec::AmountOff {
            amount: 5,
            currency: Currency::USD,
        };
        let percent = CouponSpec::PercentOff { percent: 10 };
        assert_ne!(amount, percent);
    }
}
