// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the storefront crates.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

use crate::error::ShopError;

/// Opaque product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        ProductId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        ProductId(s.to_string())
    }
}

/// A price in integer minor currency units (cents).
///
/// Prices are never stored as floats. Decimal input is converted once, at
/// the edge, with round-half-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_minor(minor: i64) -> Self {
        Price(minor)
    }

    /// Converts a decimal major-unit amount (e.g. `19.99`) into minor units.
    ///
    /// Rounds half-up: `19.995` becomes `2000`. Negative amounts are rejected.
    pub fn from_decimal(amount: Decimal) -> Result<Self, ShopError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ShopError::Validation(format!(
                "price must not be negative, got {amount}"
            )));
        }
        amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|cents| cents.to_i64())
            .map(Price)
            .ok_or_else(|| ShopError::Validation(format!("price {amount} is out of range")))
    }

    pub fn minor(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Multiplies by a line quantity, saturating on overflow.
    pub fn times(self, quantity: u32) -> Price {
        Price(self.0.saturating_mul(i64::from(quantity)))
    }
}

impl std::ops::Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, |acc, p| acc + p)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

/// Publication state of a product.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Draft,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Draft => "draft",
        }
    }
}

/// A product row in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: Price,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    pub status: ProductStatus,
    #[serde(default)]
    pub featured: bool,
    /// Remaining sellable units. `None` means stock is not tracked.
    #[serde(default)]
    pub inventory_count: Option<u32>,
    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    /// Units available for purchase, or `None` when stock is untracked.
    pub fn available(&self) -> Option<u32> {
        self.inventory_count
    }

    /// Whether `quantity` units can be sold right now.
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.inventory_count.is_none_or(|count| quantity <= count)
    }
}

/// Admin input for creating a product.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal price in major units. Required; `None` fails validation.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub inventory_count: Option<u32>,
}

/// Admin partial update. Absent fields are left untouched.
///
/// `inventory_count: null` clears stock tracking, which is why that field is
/// a double option.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub inventory_count: Option<Option<u32>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Validated field changes handed to the catalog store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub status: Option<ProductStatus>,
    pub featured: Option<bool>,
    pub inventory_count: Option<Option<u32>>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        *self == ProductChanges::default()
    }
}

/// Filter for catalog listings. Results are always newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
    pub featured: Option<bool>,
    pub category: Option<String>,
}

impl ProductFilter {
    /// Every product regardless of status (admin view).
    pub fn all() -> Self {
        Self::default()
    }

    pub fn active() -> Self {
        Self {
            status: Some(ProductStatus::Active),
            ..Self::default()
        }
    }

    pub fn featured() -> Self {
        Self {
            status: Some(ProductStatus::Active),
            featured: Some(true),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A `{product id, quantity}` pair, as carried in checkout session metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: ProductId,
    pub quantity: u32,
}

/// One line of a hosted checkout session, in gateway-agnostic form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub name: String,
    pub description: String,
    pub image_url: String,
    /// Unit price in minor currency units.
    pub unit_amount: i64,
    pub quantity: u32,
}

/// Request to open a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub currency: String,
    pub line_items: Vec<CheckoutLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
}

/// A checkout session the gateway accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionCreated {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A completed payment, ready to be reconciled against inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedCheckout {
    pub session_id: String,
    pub event_id: String,
    pub lines: Vec<OrderLine>,
}

/// What happened to one product's stock during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StockAdjustment {
    /// Stock covered the quantity.
    Decremented { product_id: ProductId, remaining: u32 },
    /// Stock was short; the count was clamped to zero.
    Clamped { product_id: ProductId, shortfall: u32 },
    /// The product does not track stock.
    Untracked { product_id: ProductId },
    /// The product no longer exists.
    Missing { product_id: ProductId },
}

/// Result of applying a confirmed checkout to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The session was already reconciled; nothing changed.
    Duplicate,
    Applied { adjustments: Vec<StockAdjustment> },
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// Current time as an RFC 3339 UTC timestamp with millisecond precision.
///
/// The fixed-width format sorts lexicographically, which the catalog relies
/// on for newest-first ordering.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn price_rounds_half_up() {
        let cases = [
            ("19.99", 1999),
            ("19.995", 2000),
            ("0.005", 1),
            ("0.004", 0),
            ("10", 1000),
            ("5.5", 550),
        ];
        for (input, expected) in cases {
            let price = Price::from_decimal(Decimal::from_str(input).unwrap()).unwrap();
            assert_eq!(price.minor(), expected, "input {input}");
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = Price::from_decimal(Decimal::from_str("-0.01").unwrap()).unwrap_err();
        assert!(matches!(err, ShopError::Validation(_)));
    }

    #[test]
    fn price_display_uses_two_decimals() {
        assert_eq!(Price::from_minor(2500).to_string(), "25.00");
        assert_eq!(Price::from_minor(5).to_string(), "0.05");
    }

    #[test]
    fn price_times_saturates() {
        assert_eq!(Price::from_minor(1000).times(2).minor(), 2000);
        assert_eq!(Price::from_minor(i64::MAX).times(2).minor(), i64::MAX);
    }

    #[test]
    fn status_parses_and_displays() {
        for status in [ProductStatus::Active, ProductStatus::Inactive, ProductStatus::Draft] {
            let parsed = ProductStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
            assert_eq!(status.as_str(), status.to_string());
        }
        let json = serde_json::to_string(&ProductStatus::Draft).unwrap();
        assert_eq!(json, "\"draft\"");
    }

    #[test]
    fn untracked_stock_is_always_available() {
        let mut product = Product {
            id: ProductId::from("p"),
            name: "Jam".into(),
            description: String::new(),
            price_cents: Price::from_minor(500),
            image_url: String::new(),
            category: String::new(),
            status: ProductStatus::Active,
            featured: false,
            inventory_count: None,
            created_at: now_timestamp(),
            updated_at: now_timestamp(),
        };
        assert!(product.has_stock_for(10_000));
        product.inventory_count = Some(2);
        assert!(product.has_stock_for(2));
        assert!(!product.has_stock_for(3));
    }

    #[test]
    fn patch_distinguishes_null_from_absent_inventory() {
        let absent: ProductPatch = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(absent.inventory_count, None);

        let cleared: ProductPatch = serde_json::from_str(r#"{"inventory_count":null}"#).unwrap();
        assert_eq!(cleared.inventory_count, Some(None));

        let set: ProductPatch = serde_json::from_str(r#"{"inventory_count":4}"#).unwrap();
        assert_eq!(set.inventory_count, Some(Some(4)));
    }

    #[test]
    fn product_input_accepts_numeric_price() {
        let input: ProductInput =
            serde_json::from_str(r#"{"name":"Honey","price":12.5,"inventory_count":3}"#).unwrap();
        assert_eq!(
            Price::from_decimal(input.price.unwrap()).unwrap().minor(),
            1250
        );
        assert_eq!(input.inventory_count, Some(3));
        assert!(input.status.is_none());
    }

    #[test]
    fn filters_compose() {
        let f = ProductFilter::featured().with_category("bread");
        assert_eq!(f.status, Some(ProductStatus::Active));
        assert_eq!(f.featured, Some(true));
        assert_eq!(f.category.as_deref(), Some("bread"));
        assert_eq!(ProductFilter::all(), ProductFilter::default());
    }
}
