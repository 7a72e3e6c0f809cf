//! # Catalog Types
//!
//! Item, Discount, and Tax records for the storefront catalog.
//! Records are seeded from `config/store.toml`.

use serde::{Deserialize, Serialize};

/// Maximum length of a record display name, matching the catalog schema
pub const MAX_NAME_LEN: usize = 20;

/// Highest item price that still fits in an `i64` unit amount after the
/// *100 minor-unit conversion
pub const MAX_PRICE: u64 = (i64::MAX / 100) as u64;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
}

impl Currency {
    /// Returns the lowercase ISO 4217 currency code the gateway expects
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// A purchasable item in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique item identifier
    pub id: u64,

    /// Display name (max 20 chars, validated at load)
    pub name: String,

    /// Long description; truncated to 200 chars on single-item checkout
    pub description: String,

    /// Price in whole currency units (the gateway receives price * 100)
    pub price: u64,

    /// Currency; may be unset, in which case the item cannot be checked out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

impl Item {
    pub fn new(id: u64, name: impl Into<String>, price: u64, currency: Currency) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            price,
            currency: Some(currency),
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Unit amount in the gateway's smallest currency unit
    pub fn unit_amount(&self) -> i64 {
        self.price as i64 * 100
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {}", self.name, self.price)
    }
}

/// A discount that maps to a gateway-side coupon, created once on first use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    /// Unique discount identifier
    pub id: u64,

    /// Display name
    pub name: String,

    /// Fixed amount off, in whole currency units (passed to the gateway as-is)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_off: Option<u64>,

    /// Percentage off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_off: Option<u64>,

    /// Remote coupon id; populated lazily on the first checkout that uses
    /// this discount, never changed afterwards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<String>,
}

impl Discount {
    pub fn percent(id: u64, name: impl Into<String>, percent_off: u64) -> Self {
        Self {
            id,
            name: name.into(),
            amount_off: None,
            percent_off: Some(percent_off),
            coupon_id: None,
        }
    }

    pub fn amount(id: u64, name: impl Into<String>, amount_off: u64) -> Self {
        Self {
            id,
            name: name.into(),
            amount_off: Some(amount_off),
            percent_off: None,
            coupon_id: None,
        }
    }
}

impl std::fmt::Display for Discount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(p) = self.percent_off {
            write!(f, "{} — {}% off", self.name, p)
        } else if let Some(a) = self.amount_off {
            write!(f, "{} — {} off", self.name, a)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// A tax that maps to a gateway-side tax rate, created once on first use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tax {
    /// Unique tax identifier
    pub id: u64,

    /// Display name
    pub name: String,

    /// Tax percentage (whole number)
    pub percentage: u64,

    /// Whether the tax is included in item prices
    pub inclusive: bool,

    /// Remote tax-rate id; same lazy set-once lifecycle as `Discount::coupon_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate_id: Option<String>,
}

impl Tax {
    pub fn new(id: u64, name: impl Into<String>, percentage: u64, inclusive: bool) -> Self {
        Self {
            id,
            name: name.into(),
            percentage,
            inclusive,
            tax_rate_id: None,
        }
    }
}

impl std::fmt::Display for Tax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {}%", self.name, self.percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::USD.as_str(), "usd");
        assert_eq!(Currency::EUR.as_str(), "eur");
        assert_eq!(Currency::USD.to_string(), "USD");
    }

    #[test]
    fn test_unit_amount() {
        let item = Item::new(1, "Mug", 10, Currency::USD);
        assert_eq!(item.unit_amount(), 1000);
    }

    #[test]
    fn test_unit_amount_at_price_bound() {
        let item = Item::new(1, "Mug", MAX_PRICE, Currency::USD);
        assert_eq!(item.unit_amount(), MAX_PRICE as i64 * 100);
        assert!(item.unit_amount() > 0);
    }

    #[test]
    fn test_item_without_currency_deserializes() {
        let item: Item = toml::from_str(
            r#"
            id = 3
            name = "Sticker"
            description = "A sticker"
            price = 2
            "#,
        )
        .unwrap();
        assert_eq!(item.currency, None);
    }

    #[test]
    fn test_discount_display() {
        assert_eq!(Discount::percent(1, "Spring", 10).to_string(), "Spring — 10% off");
        assert_eq!(Discount::amount(2, "Flat", 5).to_string(), "Flat — 5 off");
    }
}
