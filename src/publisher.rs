//! Outbound domain events.

use tracing::{debug, warn};

use crate::domain::events::DomainEvent;

/// Publishes domain events to NATS when a client is configured; otherwise drops them.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    pub fn disabled() -> Self { Self::default() }

    /// Best effort: failures are logged and never reach the caller.
    pub async fn publish(&self, event: &DomainEvent) {
        let Some(client) = &self.nats else { return };
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "could not encode domain event");
                return;
            }
        };
        match client.publish(event.subject().to_string(), payload.into()).await {
            Ok(()) => debug!(subject = event.subject(), "domain event published"),
            Err(e) => warn!(subject = event.subject(), error = %e, "domain event publish failed"),
        }
    }
}
