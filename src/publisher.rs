//! Domain event publishing over NATS.

use crate::domain::events::DomainEvent;

pub const SUBJECT_PREFIX: &str = "bundlecraft";

/// Publishes domain events when a NATS client is configured; otherwise
/// events are only logged.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    pub fn disabled() -> Self { Self { nats: None } }

    /// Connects to `url`, falling back to a disabled publisher if the
    /// server is unreachable.
    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(%url, "connected to NATS");
                Self::new(Some(client))
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "NATS unavailable, events will not be published");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    pub async fn publish_all(&self, events: Vec<DomainEvent>) {
        for event in events {
            self.publish(&event).await;
        }
    }

    pub async fn publish(&self, event: &DomainEvent) {
        let subject = format!("{SUBJECT_PREFIX}.{}", event.subject());
        tracing::debug!(%subject, ?event, "domain event");
        let Some(client) = &self.nats else { return };
        let payload = match serde_json::to_vec(event) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(%subject, error = %e, "failed to encode event");
                return;
            }
        };
        if let Err(e) = client.publish(subject.clone(), payload.into()).await {
            tracing::warn!(%subject, error = %e, "failed to publish event");
        }
    }
}
