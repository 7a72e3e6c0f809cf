//! # Checkout Service
//!
//! Orchestrates the checkout flow: resolve local records, lazily materialize
//! gateway-side coupon / tax-rate objects, assemble line items, and request a
//! hosted checkout session.
//!
//! Single-item and whole-order checkouts are the two variants of one
//! operation; each produces its line-item list through its own conversion
//! rule and both share the session-creation path.

use crate::catalog::Currency;
use crate::error::{StoreError, StoreResult};
use crate::gateway::{CouponSpec, SharedGateway, TaxRateSpec};
use crate::order::{GatewaySession, Order, SessionLineItem, SessionRequest};
use crate::store::Store;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Single-item checkouts truncate the description shown on the hosted page
const DESCRIPTION_LIMIT: usize = 200;

/// What is being checked out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// One catalog item, quantity 1
    Item(u64),
    /// All items of an order, with its discount and tax applied
    Order(u64),
}

/// Redirect URLs for the hosted checkout page
#[derive(Debug, Clone)]
pub struct RedirectUrls {
    pub success_url: String,
    pub cancel_url: String,
}

/// Checkout orchestrator over a store and a payment gateway
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<Store>,
    gateway: SharedGateway,
}

impl CheckoutService {
    pub fn new(store: Arc<Store>, gateway: SharedGateway) -> Self {
        Self { store, gateway }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Create a hosted checkout session for the target.
    ///
    /// Gateway failures during session creation are converted into
    /// `CheckoutRejected` carrying the gateway's message; failures during
    /// coupon / tax-rate materialization propagate untouched.
    #[instrument(skip(self, urls), fields(provider = self.gateway.provider_name()))]
    pub async fn checkout(
        &self,
        target: CheckoutTarget,
        urls: RedirectUrls,
    ) -> StoreResult<GatewaySession> {
        let line_items = match target {
            CheckoutTarget::Item(item_id) => vec![self.item_line_item(item_id)?],
            CheckoutTarget::Order(order_id) => self.order_line_items(order_id).await?,
        };

        debug!("Assembled {} line items", line_items.len());

        let request = SessionRequest {
            line_items,
            success_url: urls.success_url,
            cancel_url: urls.cancel_url,
        };

        let session = self
            .gateway
            .create_checkout_session(&request)
            .await
            .map_err(|e| match e {
                StoreError::Provider { message, .. } => StoreError::CheckoutRejected(message),
                StoreError::Network(message) => StoreError::CheckoutRejected(message),
                other => other,
            })?;

        info!("Created checkout session: {}", session.session_id);
        Ok(session)
    }

    /// Conversion rule for the single-item variant: one line item, quantity
    /// 1, description truncated for the hosted page.
    fn item_line_item(&self, item_id: u64) -> StoreResult<SessionLineItem> {
        let item = self
            .store
            .item(item_id)
            .ok_or(StoreError::ItemNotFound { item_id })?;

        Ok(SessionLineItem {
            name: item.name.clone(),
            description: Some(item.description.chars().take(DESCRIPTION_LIMIT).collect()),
            currency: self.item_currency(&item.currency, item_id)?,
            unit_amount: item.unit_amount(),
            quantity: 1,
            tax_rate_ids: Vec::new(),
        })
    }

    /// Conversion rule for the order variant: materialize the discount and
    /// tax first, then one line item per item occurrence (a repeated item id
    /// yields repeated line items; there is no quantity aggregation).
    async fn order_line_items(&self, order_id: u64) -> StoreResult<Vec<SessionLineItem>> {
        let order = self
            .store
            .order(order_id)
            .ok_or(StoreError::OrderNotFound { order_id })?;

        // TODO: pass the coupon id to the session request via
        // discounts[0][coupon] once product confirms discounts should apply
        // at checkout; today the coupon is only materialized.
        if let Some(discount_id) = order.discount_id {
            self.ensure_coupon(&order, discount_id).await?;
        }

        let tax_rate_id = match order.tax_id {
            Some(tax_id) => Some(self.ensure_tax_rate(tax_id).await?),
            None => None,
        };

        let mut line_items = Vec::with_capacity(order.item_ids.len());
        for &item_id in &order.item_ids {
            let item = self
                .store
                .item(item_id)
                .ok_or(StoreError::ItemNotFound { item_id })?;

            line_items.push(SessionLineItem {
                name: item.name.clone(),
                description: Some(item.description.clone()),
                currency: self.item_currency(&item.currency, item_id)?,
                unit_amount: item.unit_amount(),
                quantity: 1,
                tax_rate_ids: tax_rate_id.iter().cloned().collect(),
            });
        }

        Ok(line_items)
    }

    /// Get-or-create the remote coupon for a discount.
    ///
    /// Double-checked under the per-record lock so concurrent checkouts
    /// sharing a discount create at most one remote coupon.
    #[instrument(skip(self, order))]
    async fn ensure_coupon(&self, order: &Order, discount_id: u64) -> StoreResult<String> {
        if let Some(id) = self.store.coupon_id(discount_id) {
            return Ok(id);
        }

        let lock = self.store.coupon_lock(discount_id);
        let _guard = lock.lock().await;

        if let Some(id) = self.store.coupon_id(discount_id) {
            return Ok(id);
        }

        let discount = self
            .store
            .discount(discount_id)
            .ok_or(StoreError::DiscountNotFound { discount_id })?;

        let spec = if let Some(amount) = discount.amount_off {
            // Amount coupons carry the currency of the order's first item
            let first_id = order.item_ids.first().copied().ok_or_else(|| {
                StoreError::InvalidRequest(format!(
                    "order {} has no items to derive a coupon currency from",
                    order.id
                ))
            })?;
            let first = self
                .store
                .item(first_id)
                .ok_or(StoreError::ItemNotFound { item_id: first_id })?;
            CouponSpec::AmountOff {
                amount,
                currency: self.item_currency(&first.currency, first_id)?,
            }
        } else if let Some(percent) = discount.percent_off {
            CouponSpec::PercentOff { percent }
        } else {
            return Err(StoreError::InvalidDiscount { discount_id });
        };

        let coupon_id = self.gateway.create_coupon(&spec).await?;
        info!("Materialized coupon {} for discount {}", coupon_id, discount_id);

        self.store.set_coupon_id(discount_id, coupon_id)
    }

    /// Get-or-create the remote tax rate for a tax, same guard as coupons.
    #[instrument(skip(self))]
    async fn ensure_tax_rate(&self, tax_id: u64) -> StoreResult<String> {
        if let Some(id) = self.store.tax_rate_id(tax_id) {
            return Ok(id);
        }

        let lock = self.store.tax_rate_lock(tax_id);
        let _guard = lock.lock().await;

        if let Some(id) = self.store.tax_rate_id(tax_id) {
            return Ok(id);
        }

        let tax = self
            .store
            .tax(tax_id)
            .ok_or(StoreError::TaxNotFound { tax_id })?;

        let spec = TaxRateSpec {
            display_name: tax.name.clone(),
            percentage: tax.percentage,
            inclusive: tax.inclusive,
        };

        let tax_rate_id_str = self.gateway.create_tax_rate(&spec).await?;
        info!("Materialized tax rate {} for tax {}", tax_rate_id_str, tax_id);

        self.store.set_tax_rate_id(tax_id, tax_rate_id_str)
    }

    fn item_currency(&self, currency: &Option<Currency>, item_id: u64) -> StoreResult<Currency> {
        currency.ok_or_else(|| {
            StoreError::CheckoutRejected(format!("item {} has no currency configured", item_id))
        })
    }
}
