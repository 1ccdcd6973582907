//! Value Objects for bundles

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn usd(amount: Decimal) -> Self { Self::new(amount, "USD") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
    /// Two decimal places, halves rounded away from zero.
    pub fn round_to_cents(&self) -> Money {
        Money::new(self.amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero), &self.currency)
    }
}

impl Default for Money { fn default() -> Self { Self::zero("USD") } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.2} {}", self.amount, self.currency) }
}

#[derive(Debug, Clone)] pub enum MoneyError { CurrencyMismatch }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Currency mismatch") }
}

/// Per-bundle component multiplier. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 { return Err(QuantityError::Zero); }
        Ok(Self(value))
    }
    pub fn value(&self) -> u32 { self.0 }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }
impl TryFrom<u32> for Quantity { type Error = QuantityError; fn try_from(v: u32) -> Result<Self, Self::Error> { Self::new(v) } }
impl From<Quantity> for u32 { fn from(q: Quantity) -> u32 { q.0 } }

#[derive(Debug, Clone)] pub enum QuantityError { Zero }
impl std::error::Error for QuantityError {}
impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Quantity must be at least 1") }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[default]
    Percentage,
    FixedAmount,
    FixedPrice,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Percentage => "percentage", Self::FixedAmount => "fixed_amount", Self::FixedPrice => "fixed_price" }
    }
}

/// Discount value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount { kind: DiscountType, value: Decimal }

impl Discount {
    pub fn new(kind: DiscountType, value: Decimal) -> Result<Self, DiscountError> {
        if value.is_sign_negative() && !value.is_zero() { return Err(DiscountError::Negative); }
        if kind == DiscountType::Percentage && value > Decimal::ONE_HUNDRED { return Err(DiscountError::PercentageOverHundred); }
        Ok(Self { kind, value })
    }
    pub fn none() -> Self { Self { kind: DiscountType::Percentage, value: Decimal::ZERO } }
    pub fn kind(&self) -> DiscountType { self.kind }
    pub fn value(&self) -> Decimal { self.value }
}

impl Default for Discount { fn default() -> Self { Self::none() } }

#[derive(Debug, Clone)] pub enum DiscountError { Negative, PercentageOverHundred }
impl std::error::Error for DiscountError {}
impl fmt::Display for DiscountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Negative => write!(f, "Discount cannot be negative"), Self::PercentageOverHundred => write!(f, "Percentage discount cannot exceed 100") }
    }
}
