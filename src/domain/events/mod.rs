//! Domain events
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "aggregate", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Bundle(BundleEvent),
    Shop(ShopEvent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BundleEvent {
    Created { bundle_id: String, shop: String },
    Updated { bundle_id: String, shop: String },
    Archived { bundle_id: String, shop: String },
    Deleted { bundle_id: String, shop: String },
    Duplicated { bundle_id: String, source_id: String, shop: String },
    ParentLinked { bundle_id: String, shop: String, variant_id: String },
    OffersInvalidated { shop: String, product_ids: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShopEvent {
    Redacted { shop: String, bundles_removed: usize },
}

impl DomainEvent {
    /// Dotted subject used on the event bus.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Bundle(BundleEvent::Created { .. }) => "bundle.created",
            Self::Bundle(BundleEvent::Updated { .. }) => "bundle.updated",
            Self::Bundle(BundleEvent::Archived { .. }) => "bundle.archived",
            Self::Bundle(BundleEvent::Deleted { .. }) => "bundle.deleted",
            Self::Bundle(BundleEvent::Duplicated { .. }) => "bundle.duplicated",
            Self::Bundle(BundleEvent::ParentLinked { .. }) => "bundle.parent_linked",
            Self::Bundle(BundleEvent::OffersInvalidated { .. }) => "bundle.offers_invalidated",
            Self::Shop(ShopEvent::Redacted { .. }) => "shop.redacted",
        }
    }
}
