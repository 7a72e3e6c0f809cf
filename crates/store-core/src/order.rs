//! # Order and Checkout Session Types
//!
//! Orders reference catalog records by id; the checkout flow turns them into
//! a gateway session request.

use crate::catalog::Currency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An order grouping catalog items with an optional discount and tax
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier
    pub id: u64,

    /// Item ids in the order. Items are shared references, not owned:
    /// the same item may appear in many orders, and repeating an id here
    /// produces repeated line items at checkout.
    #[serde(rename = "items", default)]
    pub item_ids: Vec<u64>,

    /// Applied discount, if any
    #[serde(rename = "discount", default, skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<u64>,

    /// Applied tax, if any
    #[serde(rename = "tax", default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<u64>,

    /// Local payment flag. The checkout flow never sets this; payment
    /// confirmation is out of scope for this service.
    #[serde(default)]
    pub paid: bool,
}

impl Order {
    /// Create a new unpaid order
    pub fn new(id: u64, item_ids: Vec<u64>) -> Self {
        Self {
            id,
            item_ids,
            discount_id: None,
            tax_id: None,
            paid: false,
        }
    }

    /// Builder: attach a discount
    pub fn with_discount(mut self, discount_id: u64) -> Self {
        self.discount_id = Some(discount_id);
        self
    }

    /// Builder: attach a tax
    pub fn with_tax(mut self, tax_id: u64) -> Self {
        self.tax_id = Some(tax_id);
        self
    }

    /// Number of line items a checkout of this order produces
    pub fn item_count(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order #{} — {} items — {}",
            self.id,
            self.item_ids.len(),
            if self.paid { "Paid" } else { "Not Paid" }
        )
    }
}

/// One entry in a checkout session: a priced, quantified product to charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLineItem {
    /// Product display name
    pub name: String,

    /// Product description shown on the hosted checkout page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Currency of the unit amount
    pub currency: Currency,

    /// Amount in the smallest currency unit (item price * 100)
    pub unit_amount: i64,

    /// Quantity
    pub quantity: u32,

    /// Remote tax-rate ids to apply to this line item
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tax_rate_ids: Vec<String>,
}

/// A payment-mode session-creation request for the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Assembled line items
    pub line_items: Vec<SessionLineItem>,

    /// URL the gateway redirects to after successful payment
    pub success_url: String,

    /// URL the gateway redirects to if the customer cancels
    pub cancel_url: String,
}

/// An opaque, gateway-hosted checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySession {
    /// Provider's session id; the caller redirects the end user with it
    pub session_id: String,

    /// URL of the gateway's hosted payment page
    pub checkout_url: String,

    /// When the session expires, if the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl GatewaySession {
    pub fn new(session_id: impl Into<String>, checkout_url: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            checkout_url: checkout_url.into(),
            expires_at: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_display() {
        let order = Order::new(4, vec![1, 2, 2]);
        assert_eq!(order.to_string(), "Order #4 — 3 items — Not Paid");
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_order_toml_shape() {
        let order: Order = toml::from_str(
            r#"
            id = 1
            items = [1, 1, 2]
            discount = 1
            paid = false
            "#,
        )
        .unwrap();
        assert_eq!(order.item_ids, vec![1, 1, 2]);
        assert_eq!(order.discount_id, Some(1));
        assert_eq!(order.tax_id, None);
        assert!(!order.paid);
    }

    #[test]
    fn test_empty_order_allowed() {
        // The schema does not validate item presence; an empty order is
        // representable and only fails later at the gateway boundary.
        let order: Order = toml::from_str("id = 9").unwrap();
        assert!(order.is_empty());
    }
}
