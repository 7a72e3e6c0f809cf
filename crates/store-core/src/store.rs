//! # In-Memory Store
//!
//! Catalog and order storage, seeded from `config/store.toml`.
//!
//! Remote ids (coupon / tax rate) are written back with set-once semantics,
//! and each Discount/Tax record carries a per-record async lock so that
//! concurrent checkouts materialize at most one remote object per record.

use crate::catalog::{Discount, Item, Tax, MAX_NAME_LEN, MAX_PRICE};
use crate::error::{StoreError, StoreResult};
use crate::order::Order;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;

/// Per-record async locks, created on demand
#[derive(Default)]
struct LockMap {
    locks: StdMutex<HashMap<u64, Arc<AsyncMutex<()>>>>,
}

impl LockMap {
    fn get(&self, id: u64) -> Arc<AsyncMutex<()>> {
        self.locks
            .lock()
            .expect("lock map poisoned")
            .entry(id)
            .or_default()
            .clone()
    }
}

/// Seed file shape (`config/store.toml`)
#[derive(Debug, Default, Deserialize)]
pub struct StoreSeed {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub discounts: Vec<Discount>,
    #[serde(default)]
    pub taxes: Vec<Tax>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// In-memory store for catalog and order records
#[derive(Default)]
pub struct Store {
    items: RwLock<HashMap<u64, Item>>,
    discounts: RwLock<HashMap<u64, Discount>>,
    taxes: RwLock<HashMap<u64, Tax>>,
    orders: RwLock<HashMap<u64, Order>>,
    coupon_locks: LockMap,
    tax_rate_locks: LockMap,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a TOML seed string
    pub fn from_toml(toml_str: &str) -> StoreResult<Self> {
        let seed: StoreSeed = toml::from_str(toml_str)
            .map_err(|e| StoreError::Configuration(format!("Invalid store config: {}", e)))?;
        Self::from_seed(seed)
    }

    /// Build a store from a parsed seed, validating record names
    pub fn from_seed(seed: StoreSeed) -> StoreResult<Self> {
        let store = Self::new();

        for item in seed.items {
            validate_name(&item.name, "item", item.id)?;
            if item.price > MAX_PRICE {
                return Err(StoreError::Configuration(format!(
                    "item {} price {} exceeds the maximum of {}",
                    item.id, item.price, MAX_PRICE
                )));
            }
            store.insert_item(item);
        }
        for discount in seed.discounts {
            validate_name(&discount.name, "discount", discount.id)?;
            store.insert_discount(discount);
        }
        for tax in seed.taxes {
            validate_name(&tax.name, "tax", tax.id)?;
            store.insert_tax(tax);
        }
        for order in seed.orders {
            store.insert_order(order);
        }

        Ok(store)
    }

    pub fn insert_item(&self, item: Item) {
        self.items.write().expect("items poisoned").insert(item.id, item);
    }

    pub fn insert_discount(&self, discount: Discount) {
        self.discounts
            .write()
            .expect("discounts poisoned")
            .insert(discount.id, discount);
    }

    pub fn insert_tax(&self, tax: Tax) {
        self.taxes.write().expect("taxes poisoned").insert(tax.id, tax);
    }

    pub fn insert_order(&self, order: Order) {
        self.orders.write().expect("orders poisoned").insert(order.id, order);
    }

    pub fn item(&self, id: u64) -> Option<Item> {
        self.items.read().expect("items poisoned").get(&id).cloned()
    }

    pub fn discount(&self, id: u64) -> Option<Discount> {
        self.discounts.read().expect("discounts poisoned").get(&id).cloned()
    }

    pub fn tax(&self, id: u64) -> Option<Tax> {
        self.taxes.read().expect("taxes poisoned").get(&id).cloned()
    }

    pub fn order(&self, id: u64) -> Option<Order> {
        self.orders.read().expect("orders poisoned").get(&id).cloned()
    }

    pub fn item_count(&self) -> usize {
        self.items.read().expect("items poisoned").len()
    }

    pub fn order_count(&self) -> usize {
        self.orders.read().expect("orders poisoned").len()
    }

    /// Current remote coupon id for a discount, if materialized
    pub fn coupon_id(&self, discount_id: u64) -> Option<String> {
        self.discounts
            .read()
            .expect("discounts poisoned")
            .get(&discount_id)
            .and_then(|d| d.coupon_id.clone())
    }

    /// Current remote tax-rate id for a tax, if materialized
    pub fn tax_rate_id(&self, tax_id: u64) -> Option<String> {
        self.taxes
            .read()
            .expect("taxes poisoned")
            .get(&tax_id)
            .and_then(|t| t.tax_rate_id.clone())
    }

    /// Persist a remote coupon id. Set-once: if an id is already stored the
    /// existing value wins and is returned.
    pub fn set_coupon_id(&self, discount_id: u64, coupon_id: String) -> StoreResult<String> {
        let mut discounts = self.discounts.write().expect("discounts poisoned");
        let discount = discounts
            .get_mut(&discount_id)
            .ok_or(StoreError::DiscountNotFound { discount_id })?;
        Ok(discount.coupon_id.get_or_insert(coupon_id).clone())
    }

    /// Persist a remote tax-rate id with the same set-once semantics.
    pub fn set_tax_rate_id(&self, tax_id: u64, tax_rate_id: String) -> StoreResult<String> {
        let mut taxes = self.taxes.write().expect("taxes poisoned");
        let tax = taxes
            .get_mut(&tax_id)
            .ok_or(StoreError::TaxNotFound { tax_id })?;
        Ok(tax.tax_rate_id.get_or_insert(tax_rate_id).clone())
    }

    /// Materialization lock for a discount record
    pub fn coupon_lock(&self, discount_id: u64) -> Arc<AsyncMutex<()>> {
        self.coupon_locks.get(discount_id)
    }

    /// Materialization lock for a tax record
    pub fn tax_rate_lock(&self, tax_id: u64) -> Arc<AsyncMutex<()>> {
        self.tax_rate_locks.get(tax_id)
    }
}

fn validate_name(name: &str, kind: &str, id: u64) -> StoreResult<()> {
    if name.chars().count() > MAX_NAME_LEN {
        return Err(StoreError::Configuration(format!(
            "{} {} name exceeds {} chars: {:?}",
            kind, id, MAX_NAME_LEN, name
        )));
    }
    Ok(())
}
