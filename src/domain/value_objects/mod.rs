//! Value objects shared across the storefront domain.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Catalog item code, normalized to uppercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() {
            return Err(SkuError::Empty);
        }
        if value.len() > 50 {
            return Err(SkuError::TooLong);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkuError {
    #[error("SKU must not be empty")]
    Empty,
    #[error("SKU longer than 50 characters")]
    TooLong,
}

/// Monetary amount in BRL. All storefront prices share one currency, so
/// arithmetic never mixes units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn brl(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn add(&self, other: Money) -> Money {
        Money(self.0 + other.0)
    }

    pub fn multiply(&self, qty: u32) -> Money {
        Money(self.0 * Decimal::from(qty))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    /// Brazilian notation: `R$ 12,50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = format!("{:.2}", self.0.round_dp(2)).replace('.', ",");
        write!(f, "R$ {rendered}")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn add(&self, other: u32) -> Self {
        Self(self.0.saturating_add(other))
    }

    pub fn subtract(&self, other: u32) -> Option<Self> {
        self.0.checked_sub(other).map(Self)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}
