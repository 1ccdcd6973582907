//! Bundle and settings storage.
//!
//! The service only talks to [`BundleStore`]; [`MemoryStore`] keeps
//! everything in process and is what the binary runs with.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::aggregates::{AppSettings, Bundle};
use crate::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub bundles: usize,
    pub settings: usize,
}

/// Storage for bundles and per-shop settings. Every lookup is scoped to a
/// shop; a bundle id from one shop is never visible from another.
#[async_trait]
pub trait BundleStore: Send + Sync + 'static {
    /// All bundles of a shop, newest first.
    async fn list_bundles(&self, shop: &str) -> Result<Vec<Bundle>>;

    async fn get_bundle(&self, shop: &str, id: &str) -> Result<Option<Bundle>>;

    /// Insert or replace by id.
    async fn save_bundle(&self, bundle: &Bundle) -> Result<()>;

    async fn delete_bundle(&self, shop: &str, id: &str) -> Result<Option<Bundle>>;

    async fn bundles_with_product(&self, shop: &str, product_id: &str) -> Result<Vec<Bundle>>;

    async fn get_settings(&self, shop: &str) -> Result<Option<AppSettings>>;

    async fn save_settings(&self, settings: &AppSettings) -> Result<()>;

    /// Remove everything stored for a shop.
    async fn purge_shop(&self, shop: &str) -> Result<PurgeSummary>;
}

type BundleKey = (String, String);

#[derive(Default)]
pub struct MemoryStore {
    bundles: RwLock<HashMap<BundleKey, Bundle>>,
    settings: RwLock<HashMap<String, AppSettings>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl BundleStore for MemoryStore {
    async fn list_bundles(&self, shop: &str) -> Result<Vec<Bundle>> {
        let bundles = self.bundles.read().await;
        let mut found: Vec<Bundle> = bundles.values().filter(|b| b.shop() == shop).cloned().collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then_with(|| b.id().cmp(a.id())));
        Ok(found)
    }

    async fn get_bundle(&self, shop: &str, id: &str) -> Result<Option<Bundle>> {
        let bundles = self.bundles.read().await;
        Ok(bundles.get(&(shop.to_string(), id.to_string())).cloned())
    }

    async fn save_bundle(&self, bundle: &Bundle) -> Result<()> {
        let mut bundles = self.bundles.write().await;
        bundles.insert((bundle.shop().to_string(), bundle.id().to_string()), bundle.clone());
        Ok(())
    }

    async fn delete_bundle(&self, shop: &str, id: &str) -> Result<Option<Bundle>> {
        let mut bundles = self.bundles.write().await;
        Ok(bundles.remove(&(shop.to_string(), id.to_string())))
    }

    async fn bundles_with_product(&self, shop: &str, product_id: &str) -> Result<Vec<Bundle>> {
        let mut found = self.list_bundles(shop).await?;
        found.retain(|b| b.contains_product(product_id));
        Ok(found)
    }

    async fn get_settings(&self, shop: &str) -> Result<Option<AppSettings>> {
        Ok(self.settings.read().await.get(shop).cloned())
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        self.settings.write().await.insert(settings.shop().to_string(), settings.clone());
        Ok(())
    }

    async fn purge_shop(&self, shop: &str) -> Result<PurgeSummary> {
        let mut bundles = self.bundles.write().await;
        let before = bundles.len();
        bundles.retain(|(owner, _), _| owner != shop);
        let removed = before - bundles.len();
        let settings = usize::from(self.settings.write().await.remove(shop).is_some());
        Ok(PurgeSummary { bundles: removed, settings })
    }
}
