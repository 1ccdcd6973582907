//! Bundle Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::events::{BundleEvent, DomainEvent};
use crate::domain::metafields::{self, MetafieldInput};
use crate::domain::pricing;
use crate::domain::value_objects::{Discount, DiscountType, Money, Quantity};
use crate::{BundleError, Result};

#[derive(Clone, Debug, Serialize)]
pub struct Bundle {
    id: String,
    shop: String,
    title: String,
    description: Option<String>,
    status: BundleStatus,
    discount: Discount,
    bundle_type: BundleType,
    show_on_product: bool,
    badge_text: Option<String>,
    components: Vec<BundleComponent>,
    parent: Option<BundleParent>,
    original_price: Money,
    bundle_price: Money,
    savings: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BundleComponent {
    pub product_id: String,
    pub variant_id: String,
    pub product_title: String,
    pub variant_title: Option<String>,
    pub product_image: Option<String>,
    pub price: Decimal,
    pub quantity: Quantity,
    pub sort_order: u32,
}

/// The purchasable product variant that stands for the whole bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BundleParent {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1))]
    pub variant_id: String,
    pub handle: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleStatus { #[default] Active, Draft, Archived }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleType { #[default] Fixed }

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct BundleInput {
    #[validate(length(min = 1, message = "Please enter a bundle title"))]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<BundleStatus>,
    pub discount_type: Option<DiscountType>,
    #[serde(default)]
    pub discount_value: Decimal,
    #[serde(default)]
    pub bundle_type: BundleType,
    pub show_on_product: Option<bool>,
    pub badge_text: Option<String>,
    #[validate(length(min = 2, message = "Please add at least 2 products"))]
    pub components: Vec<BundleComponentInput>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct BundleComponentInput {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1))]
    pub variant_id: String,
    pub product_title: String,
    pub variant_title: Option<String>,
    pub product_image: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

/// Values a new bundle falls back to when its input leaves them out.
#[derive(Clone, Debug)]
pub struct BundleDefaults {
    pub currency: String,
    pub discount_type: DiscountType,
    pub badge_text: Option<String>,
}

impl Default for BundleDefaults {
    fn default() -> Self { Self { currency: "USD".into(), discount_type: DiscountType::Percentage, badge_text: None } }
}

/// Storefront summary of one active bundle, stored on each component product.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOffer {
    pub bundle_title: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub discount_label: String,
    pub handle: String,
    /// Present only when the shop shows savings on the storefront.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<Decimal>,
}

impl BundleInput {
    fn check(&self) -> Result<()> {
        self.validate().map_err(|e| BundleError::Validation(e.to_string()))?;
        if self.title.trim().is_empty() { return Err(BundleError::Validation("Please enter a bundle title".into())); }
        for c in &self.components {
            c.validate().map_err(|e| BundleError::Validation(e.to_string()))?;
        }
        Ok(())
    }

    fn discount(&self, default_kind: DiscountType) -> Result<Discount> {
        Discount::new(self.discount_type.unwrap_or(default_kind), self.discount_value).map_err(|e| BundleError::Validation(e.to_string()))
    }

    fn build_components(&self) -> Result<Vec<BundleComponent>> {
        self.components.iter().enumerate().map(|(idx, c)| {
            let quantity = Quantity::new(c.quantity).map_err(|e| BundleError::Validation(e.to_string()))?;
            Ok(BundleComponent {
                product_id: c.product_id.clone(), variant_id: c.variant_id.clone(), product_title: c.product_title.clone(),
                variant_title: c.variant_title.clone(), product_image: c.product_image.clone(), price: c.price, quantity,
                sort_order: idx as u32,
            })
        }).collect()
    }
}

impl Bundle {
    pub fn create(shop: impl Into<String>, input: BundleInput, defaults: &BundleDefaults) -> Result<Self> {
        input.check()?;
        let discount = input.discount(defaults.discount_type)?;
        let components = input.build_components()?;
        let id = Uuid::now_v7().to_string();
        let shop = shop.into();
        let now = Utc::now();
        let mut bundle = Self {
            id: id.clone(), shop: shop.clone(), title: input.title.trim().to_string(), description: input.description,
            status: input.status.unwrap_or_default(), discount, bundle_type: input.bundle_type,
            show_on_product: input.show_on_product.unwrap_or(true), badge_text: input.badge_text.or_else(|| defaults.badge_text.clone()),
            components, parent: None, original_price: Money::zero(&defaults.currency), bundle_price: Money::zero(&defaults.currency),
            savings: Money::zero(&defaults.currency), created_at: now, updated_at: now, events: vec![],
        };
        bundle.reprice();
        bundle.raise_event(DomainEvent::Bundle(BundleEvent::Created { bundle_id: id, shop }));
        Ok(bundle)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn shop(&self) -> &str { &self.shop }
    pub fn title(&self) -> &str { &self.title }
    pub fn status(&self) -> BundleStatus { self.status }
    pub fn discount(&self) -> &Discount { &self.discount }
    pub fn badge_text(&self) -> Option<&str> { self.badge_text.as_deref() }
    pub fn show_on_product(&self) -> bool { self.show_on_product }
    pub fn components(&self) -> &[BundleComponent] { &self.components }
    pub fn parent(&self) -> Option<&BundleParent> { self.parent.as_ref() }
    pub fn original_price(&self) -> &Money { &self.original_price }
    pub fn bundle_price(&self) -> &Money { &self.bundle_price }
    pub fn savings(&self) -> &Money { &self.savings }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn is_active(&self) -> bool { self.status == BundleStatus::Active }

    /// Distinct component product ids, in component order.
    pub fn product_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.components.len());
        for c in &self.components {
            if !ids.contains(&c.product_id) { ids.push(c.product_id.clone()); }
        }
        ids
    }

    pub fn contains_product(&self, product_id: &str) -> bool { self.components.iter().any(|c| c.product_id == product_id) }

    /// Replaces every editable field and the whole component list. The parent
    /// variant link is kept.
    pub fn update(&mut self, input: BundleInput) -> Result<()> {
        input.check()?;
        let discount = input.discount(self.discount.kind())?;
        self.components = input.build_components()?;
        self.title = input.title.trim().to_string();
        self.description = input.description;
        self.status = input.status.unwrap_or_default();
        self.discount = discount;
        self.bundle_type = input.bundle_type;
        self.show_on_product = input.show_on_product.unwrap_or(true);
        self.badge_text = input.badge_text;
        self.reprice();
        self.raise_event(DomainEvent::Bundle(BundleEvent::Updated { bundle_id: self.id.clone(), shop: self.shop.clone() }));
        Ok(())
    }

    pub fn archive(&mut self) {
        self.status = BundleStatus::Archived;
        self.touch();
        self.raise_event(DomainEvent::Bundle(BundleEvent::Archived { bundle_id: self.id.clone(), shop: self.shop.clone() }));
    }

    /// Draft copy with a fresh id and no parent variant.
    pub fn duplicate(&self) -> Bundle {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now();
        let mut copy = Self {
            id: id.clone(), title: format!("{} (Copy)", self.title), status: BundleStatus::Draft, parent: None,
            created_at: now, updated_at: now, events: vec![], ..self.clone()
        };
        copy.raise_event(DomainEvent::Bundle(BundleEvent::Duplicated { bundle_id: id, source_id: self.id.clone(), shop: self.shop.clone() }));
        copy
    }

    pub fn link_parent(&mut self, parent: BundleParent) -> Result<()> {
        parent.validate().map_err(|e| BundleError::Validation(e.to_string()))?;
        let variant_id = parent.variant_id.clone();
        self.parent = Some(parent);
        self.touch();
        self.raise_event(DomainEvent::Bundle(BundleEvent::ParentLinked { bundle_id: self.id.clone(), shop: self.shop.clone(), variant_id }));
        Ok(())
    }

    /// The two parent-variant metafields read by the cart transform, in
    /// component order.
    pub fn component_metafields(&self) -> Result<Vec<MetafieldInput>> {
        let parent = self.parent.as_ref().ok_or(BundleError::NotLinked)?;
        let refs: Vec<&str> = self.components.iter().map(|c| c.variant_id.as_str()).collect();
        let qtys: Vec<u32> = self.components.iter().map(|c| c.quantity.value()).collect();
        let encode = |e: serde_json::Error| BundleError::StorageError(e.to_string());
        Ok(vec![
            MetafieldInput::new(&parent.variant_id, metafields::COMPONENT_REFERENCE_KEY, "list.variant_reference", &refs).map_err(encode)?,
            MetafieldInput::new(&parent.variant_id, metafields::COMPONENT_QUANTITIES_KEY, "list.number_integer", &qtys).map_err(encode)?,
        ])
    }

    pub fn offer(&self, show_savings: bool) -> BundleOffer {
        BundleOffer {
            bundle_title: self.title.clone(),
            discount_type: self.discount.kind(),
            discount_value: self.discount.value(),
            discount_label: pricing::discount_label(&self.discount),
            handle: self.parent.as_ref().and_then(|p| p.handle.clone()).unwrap_or_default(),
            savings: show_savings.then(|| self.savings.amount()),
        }
    }

    fn reprice(&mut self) {
        let currency = self.original_price.currency().to_string();
        self.original_price = pricing::original_price(&self.components, &currency);
        self.bundle_price = pricing::calculate_bundle_price(&self.original_price, &self.discount);
        self.savings = pricing::savings(&self.original_price, &self.bundle_price);
        self.touch();
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn component_input(product: &str, variant: &str, price: i64, quantity: u32) -> BundleComponentInput {
        BundleComponentInput {
            product_id: format!("gid://shopify/Product/{product}"), variant_id: format!("gid://shopify/ProductVariant/{variant}"),
            product_title: format!("Product {product}"), variant_title: None, product_image: None,
            price: Decimal::new(price, 2), quantity,
        }
    }

    pub(crate) fn sample_input() -> BundleInput {
        BundleInput {
            title: "Coffee Starter Kit".into(), description: None, status: None, discount_type: Some(DiscountType::Percentage),
            discount_value: Decimal::new(10, 0), bundle_type: BundleType::Fixed, show_on_product: None, badge_text: None,
            components: vec![component_input("1", "11", 2000, 1), component_input("2", "21", 500, 2)],
        }
    }

    #[test]
    fn test_create_prices_bundle() {
        let mut b = Bundle::create("demo.myshopify.com", sample_input(), &BundleDefaults::default()).unwrap();
        assert_eq!(b.status(), BundleStatus::Active);
        assert_eq!(b.original_price().amount(), Decimal::new(30, 0));
        assert_eq!(b.bundle_price().amount(), Decimal::new(27, 0));
        assert_eq!(b.savings().amount(), Decimal::new(3, 0));
        assert_eq!(b.components()[1].sort_order, 1);
        assert_eq!(b.take_events().len(), 1);
        assert!(b.take_events().is_empty());
    }

    #[test]
    fn test_create_rejects_single_component() {
        let mut input = sample_input();
        input.components.truncate(1);
        match Bundle::create("s", input, &BundleDefaults::default()) {
            Err(BundleError::Validation(message)) => assert!(message.contains("Please add at least 2 products")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_rejects_blank_title_and_zero_quantity() {
        let mut input = sample_input();
        input.title = "   ".into();
        assert!(Bundle::create("s", input, &BundleDefaults::default()).is_err());
        let mut input = sample_input();
        input.components[0].quantity = 0;
        assert!(Bundle::create("s", input, &BundleDefaults::default()).is_err());
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let mut input = sample_input();
        input.discount_type = None;
        input.discount_value = Decimal::new(5, 0);
        let defaults = BundleDefaults { currency: "EUR".into(), discount_type: DiscountType::FixedAmount, badge_text: Some("Bundle & Save".into()) };
        let b = Bundle::create("s", input, &defaults).unwrap();
        assert_eq!(b.discount().kind(), DiscountType::FixedAmount);
        assert_eq!(b.badge_text(), Some("Bundle & Save"));
        assert_eq!(b.bundle_price().currency(), "EUR");
        assert_eq!(b.bundle_price().amount(), Decimal::new(25, 0));
    }

    #[test]
    fn test_update_replaces_components_and_keeps_parent() {
        let mut b = Bundle::create("s", sample_input(), &BundleDefaults::default()).unwrap();
        b.link_parent(BundleParent { product_id: "gid://shopify/Product/99".into(), variant_id: "gid://shopify/ProductVariant/990".into(), handle: None }).unwrap();
        let mut input = sample_input();
        input.components = vec![component_input("3", "31", 1000, 3), component_input("1", "11", 2000, 1), component_input("4", "41", 100, 1)];
        b.update(input).unwrap();
        assert_eq!(b.components().len(), 3);
        assert_eq!(b.components()[2].sort_order, 2);
        assert_eq!(b.original_price().amount(), Decimal::new(51, 0));
        assert!(b.parent().is_some());
    }

    #[test]
    fn test_duplicate_is_unlinked_draft() {
        let mut b = Bundle::create("s", sample_input(), &BundleDefaults::default()).unwrap();
        b.link_parent(BundleParent { product_id: "p".into(), variant_id: "v".into(), handle: None }).unwrap();
        let mut copy = b.duplicate();
        assert_ne!(copy.id(), b.id());
        assert_eq!(copy.title(), "Coffee Starter Kit (Copy)");
        assert_eq!(copy.status(), BundleStatus::Draft);
        assert!(copy.parent().is_none());
        assert!(matches!(copy.take_events()[0], DomainEvent::Bundle(BundleEvent::Duplicated { .. })));
    }

    #[test]
    fn test_component_metafields_follow_component_order() {
        let mut b = Bundle::create("s", sample_input(), &BundleDefaults::default()).unwrap();
        assert!(matches!(b.component_metafields(), Err(BundleError::NotLinked)));
        b.link_parent(BundleParent { product_id: "gid://shopify/Product/99".into(), variant_id: "gid://shopify/ProductVariant/990".into(), handle: Some("coffee-kit".into()) }).unwrap();
        let fields = b.component_metafields().unwrap();
        assert_eq!(fields[0].value, r#"["gid://shopify/ProductVariant/11","gid://shopify/ProductVariant/21"]"#);
        assert_eq!(fields[1].value, "[1,2]");
        assert_eq!(fields[1].owner_id, "gid://shopify/ProductVariant/990");
        assert_eq!(b.offer(false).handle, "coffee-kit");
        assert_eq!(b.offer(false).discount_label, "10%");
        assert_eq!(b.offer(false).savings, None);
        assert_eq!(b.offer(true).savings, Some(Decimal::new(3, 0)));
    }

    #[test]
    fn test_product_ids_are_distinct() {
        let mut input = sample_input();
        input.components.push(component_input("1", "12", 2000, 1));
        let b = Bundle::create("s", input, &BundleDefaults::default()).unwrap();
        assert_eq!(b.product_ids(), vec!["gid://shopify/Product/1".to_string(), "gid://shopify/Product/2".to_string()]);
    }
}
