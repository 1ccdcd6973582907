//! Request-level bundle operations over a [`BundleStore`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::{AppSettings, Bundle, BundleInput, BundleOffer, BundleParent, BundleStatus, SettingsInput};
use crate::domain::events::{BundleEvent, DomainEvent, ShopEvent};
use crate::domain::metafields::{self, MetafieldInput};
use crate::publisher::EventPublisher;
use crate::store::{BundleStore, PurgeSummary};
use crate::{BundleError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Draft,
    Archived,
}

impl StatusFilter {
    fn matches(&self, status: BundleStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == BundleStatus::Active,
            Self::Draft => status == BundleStatus::Draft,
            Self::Archived => status == BundleStatus::Archived,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams { pub status: Option<StatusFilter>, pub page: Option<u32>, pub per_page: Option<u32> }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BundleStats { pub total: usize, pub active: usize, pub draft: usize, pub archived: usize }

#[derive(Debug, Serialize)]
pub struct BundleList { pub data: Vec<Bundle>, pub total: usize, pub page: u32, pub stats: BundleStats }

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookTopic {
    ShopRedact,
    CustomersDataRequest,
    CustomersRedact,
    Other(String),
}

impl WebhookTopic {
    /// Accepts both `shop/redact` and `SHOP_REDACT` spellings.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().replace('/', "_").as_str() {
            "SHOP_REDACT" => Self::ShopRedact,
            "CUSTOMERS_DATA_REQUEST" => Self::CustomersDataRequest,
            "CUSTOMERS_REDACT" => Self::CustomersRedact,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    Purged(PurgeSummary),
    NoCustomerData,
    Ignored,
}

#[derive(Clone)]
pub struct BundleService {
    store: Arc<dyn BundleStore>,
    publisher: EventPublisher,
    currency: String,
}

impl BundleService {
    pub fn new(store: Arc<dyn BundleStore>, publisher: EventPublisher, currency: impl Into<String>) -> Self {
        Self { store, publisher, currency: currency.into() }
    }

    pub async fn list(&self, shop: &str, params: &ListParams) -> Result<BundleList> {
        let page = params.page.unwrap_or(1).max(1);
        let per_page = params.per_page.unwrap_or(20).clamp(1, 100);
        let all = self.store.list_bundles(shop).await?;

        let mut stats = BundleStats { total: all.len(), ..Default::default() };
        for b in &all {
            match b.status() {
                BundleStatus::Active => stats.active += 1,
                BundleStatus::Draft => stats.draft += 1,
                BundleStatus::Archived => stats.archived += 1,
            }
        }

        let filter = params.status.unwrap_or_default();
        let matching: Vec<Bundle> = all.into_iter().filter(|b| filter.matches(b.status())).collect();
        let total = matching.len();
        let offset = (page - 1).saturating_mul(per_page) as usize;
        let data = matching.into_iter().skip(offset).take(per_page as usize).collect();
        Ok(BundleList { data, total, page, stats })
    }

    pub async fn get(&self, shop: &str, id: &str) -> Result<Bundle> {
        self.store.get_bundle(shop, id).await?.ok_or(BundleError::BundleNotFound)
    }

    pub async fn create(&self, shop: &str, input: BundleInput) -> Result<Bundle> {
        let defaults = self.settings(shop).await?.bundle_defaults(&self.currency);
        let mut bundle = Bundle::create(shop, input, &defaults)?;
        self.store.save_bundle(&bundle).await?;
        tracing::info!(shop, bundle_id = bundle.id(), price = %bundle.bundle_price(), "bundle created");
        let products = bundle.product_ids();
        self.emit(shop, bundle.take_events(), products).await;
        Ok(bundle)
    }

    pub async fn update(&self, shop: &str, id: &str, input: BundleInput) -> Result<Bundle> {
        let mut bundle = self.get(shop, id).await?;
        let mut affected = bundle.product_ids();
        bundle.update(input)?;
        self.store.save_bundle(&bundle).await?;
        tracing::info!(shop, bundle_id = id, price = %bundle.bundle_price(), "bundle updated");
        for p in bundle.product_ids() {
            if !affected.contains(&p) { affected.push(p); }
        }
        self.emit(shop, bundle.take_events(), affected).await;
        Ok(bundle)
    }

    pub async fn delete(&self, shop: &str, id: &str) -> Result<Bundle> {
        let bundle = self.store.delete_bundle(shop, id).await?.ok_or(BundleError::BundleNotFound)?;
        tracing::info!(shop, bundle_id = id, "bundle deleted");
        let deleted = DomainEvent::Bundle(BundleEvent::Deleted { bundle_id: id.to_string(), shop: shop.to_string() });
        self.emit(shop, vec![deleted], bundle.product_ids()).await;
        Ok(bundle)
    }

    pub async fn duplicate(&self, shop: &str, id: &str) -> Result<Bundle> {
        let mut copy = self.get(shop, id).await?.duplicate();
        self.store.save_bundle(&copy).await?;
        tracing::info!(shop, source_id = id, bundle_id = copy.id(), "bundle duplicated");
        // Drafts without a parent variant never appear in offers.
        self.emit(shop, copy.take_events(), Vec::new()).await;
        Ok(copy)
    }

    pub async fn archive(&self, shop: &str, id: &str) -> Result<Bundle> {
        let mut bundle = self.get(shop, id).await?;
        bundle.archive();
        self.store.save_bundle(&bundle).await?;
        tracing::info!(shop, bundle_id = id, "bundle archived");
        let products = bundle.product_ids();
        self.emit(shop, bundle.take_events(), products).await;
        Ok(bundle)
    }

    pub async fn link_parent(&self, shop: &str, id: &str, parent: BundleParent) -> Result<Bundle> {
        let mut bundle = self.get(shop, id).await?;
        bundle.link_parent(parent)?;
        self.store.save_bundle(&bundle).await?;
        tracing::info!(shop, bundle_id = id, "bundle linked to parent variant");
        let products = bundle.product_ids();
        self.emit(shop, bundle.take_events(), products).await;
        Ok(bundle)
    }

    /// Metafields to write on the bundle's parent variant.
    pub async fn variant_metafields(&self, shop: &str, id: &str) -> Result<Vec<MetafieldInput>> {
        self.get(shop, id).await?.component_metafields()
    }

    /// Offers shown on a component product's page: active bundles that have
    /// a purchasable parent variant.
    pub async fn product_offers(&self, shop: &str, product_id: &str) -> Result<Vec<BundleOffer>> {
        let show_savings = self.settings(shop).await?.show_savings();
        let bundles = self.store.bundles_with_product(shop, product_id).await?;
        Ok(bundles.iter().filter(|b| b.is_active() && b.parent().is_some()).map(|b| b.offer(show_savings)).collect())
    }

    pub async fn product_offers_metafield(&self, shop: &str, product_id: &str) -> Result<MetafieldInput> {
        let offers = self.product_offers(shop, product_id).await?;
        MetafieldInput::new(product_id, metafields::BUNDLE_OFFERS_KEY, "json", &offers).map_err(|e| BundleError::StorageError(e.to_string()))
    }

    pub async fn settings(&self, shop: &str) -> Result<AppSettings> {
        Ok(self.store.get_settings(shop).await?.unwrap_or_else(|| AppSettings::defaults_for(shop)))
    }

    pub async fn save_settings(&self, shop: &str, input: SettingsInput) -> Result<AppSettings> {
        input.validate().map_err(|e| BundleError::Validation(e.to_string()))?;
        let mut settings = self.settings(shop).await?;
        settings.update(input);
        self.store.save_settings(&settings).await?;
        tracing::info!(shop, "settings saved");
        Ok(settings)
    }

    pub async fn handle_webhook(&self, shop: &str, topic: &WebhookTopic) -> Result<WebhookOutcome> {
        tracing::info!(shop, ?topic, "received webhook");
        match topic {
            WebhookTopic::ShopRedact => {
                let summary = self.store.purge_shop(shop).await?;
                tracing::info!(shop, bundles = summary.bundles, "shop data purged");
                let redacted = DomainEvent::Shop(ShopEvent::Redacted { shop: shop.to_string(), bundles_removed: summary.bundles });
                self.publisher.publish(&redacted).await;
                Ok(WebhookOutcome::Purged(summary))
            }
            // No customer data is stored.
            WebhookTopic::CustomersDataRequest | WebhookTopic::CustomersRedact => Ok(WebhookOutcome::NoCustomerData),
            WebhookTopic::Other(name) => {
                tracing::warn!(shop, topic = %name, "unhandled webhook topic");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn emit(&self, shop: &str, mut events: Vec<DomainEvent>, affected_products: Vec<String>) {
        if !affected_products.is_empty() {
            events.push(DomainEvent::Bundle(BundleEvent::OffersInvalidated { shop: shop.to_string(), product_ids: affected_products }));
        }
        self.publisher.publish_all(events).await;
    }
}
