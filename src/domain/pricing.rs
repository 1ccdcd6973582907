//! Bundle price arithmetic

use rust_decimal::Decimal;

use crate::domain::aggregates::bundle::BundleComponent;
use crate::domain::value_objects::{Discount, DiscountType, Money};

/// Sum of unit price × quantity over all components.
pub fn original_price(components: &[BundleComponent], currency: &str) -> Money {
    components
        .iter()
        .fold(Money::zero(currency), |acc, c| {
            acc.add(&Money::new(c.price, currency).multiply(c.quantity.value())).unwrap_or(acc)
        })
        .round_to_cents()
}

/// Price charged for the bundle's purchasable variant.
pub fn calculate_bundle_price(original: &Money, discount: &Discount) -> Money {
    let value = discount.value();
    let amount = match discount.kind() {
        DiscountType::Percentage => original.amount() * (Decimal::ONE - value / Decimal::ONE_HUNDRED),
        DiscountType::FixedAmount => (original.amount() - value).max(Decimal::ZERO),
        DiscountType::FixedPrice => value,
    };
    Money::new(amount, original.currency()).round_to_cents()
}

pub fn savings(original: &Money, bundle: &Money) -> Money {
    let diff = (original.amount() - bundle.amount()).max(Decimal::ZERO);
    Money::new(diff, original.currency()).round_to_cents()
}

/// Short label shown on storefront offers, empty for fixed-price bundles.
pub fn discount_label(discount: &Discount) -> String {
    let value = discount.value().normalize();
    match discount.kind() {
        DiscountType::Percentage => format!("{value}%"),
        DiscountType::FixedAmount => format!("${value}"),
        DiscountType::FixedPrice => String::new(),
    }
}
