//! BundleCraft - bundle management and cart transform service

use anyhow::Result;
use bundlecraft::{api::{self, AppState}, publisher::EventPublisher, BundleService, Config, MemoryStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let publisher = EventPublisher::connect(config.nats_url.as_deref()).await;
    let bundles = BundleService::new(Arc::new(MemoryStore::new()), publisher, config.currency.clone());
    let app = api::router(AppState { bundles });

    let addr = config.bind_addr();
    tracing::info!(currency = %config.currency, "BundleCraft listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
