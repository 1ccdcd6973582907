//! Per-shop app settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::bundle::BundleDefaults;
use crate::domain::value_objects::DiscountType;

pub const DEFAULT_BADGE_TEXT: &str = "Bundle & Save";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppSettings {
    shop: String,
    default_discount_type: DiscountType,
    default_badge_text: String,
    show_savings: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct SettingsInput {
    pub default_discount_type: DiscountType,
    #[validate(length(max = 64))]
    pub default_badge_text: String,
    pub show_savings: bool,
}

impl AppSettings {
    /// Settings a shop has before it saves any.
    pub fn defaults_for(shop: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            shop: shop.into(), default_discount_type: DiscountType::Percentage, default_badge_text: DEFAULT_BADGE_TEXT.to_string(),
            show_savings: true, created_at: now, updated_at: now,
        }
    }

    pub fn shop(&self) -> &str { &self.shop }
    pub fn default_discount_type(&self) -> DiscountType { self.default_discount_type }
    pub fn default_badge_text(&self) -> &str { &self.default_badge_text }
    pub fn show_savings(&self) -> bool { self.show_savings }

    pub fn update(&mut self, input: SettingsInput) {
        self.default_discount_type = input.default_discount_type;
        self.default_badge_text = input.default_badge_text;
        self.show_savings = input.show_savings;
        self.updated_at = Utc::now();
    }

    pub fn bundle_defaults(&self, currency: &str) -> BundleDefaults {
        let badge = (!self.default_badge_text.is_empty()).then(|| self.default_badge_text.clone());
        BundleDefaults { currency: currency.to_string(), discount_type: self.default_discount_type, badge_text: badge }
    }
}
