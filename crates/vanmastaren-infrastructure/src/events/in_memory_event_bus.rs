use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

use vanmastaren_domain::events::{DomainEvent, EventBus, Subscription};
use vanmastaren_domain::shared::DomainError;

/// In-memory event bus implementation
///
/// Handlers run in subscription order on the publisher's task. A failing
/// handler is logged and does not stop the others.
pub struct InMemoryEventBus {
    subscriptions: Arc<RwLock<HashMap<&'static str, Vec<Subscription>>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn subscribe(&self, subscription: Subscription) {
        let event_type = subscription.event_type();
        self.subscriptions
            .write()
            .await
            .entry(event_type)
            .or_default()
            .push(subscription);

        debug!(event_type, "Subscribed event handler");
    }

    /// Number of handlers registered for `E`.
    pub async fn handler_count<E: DomainEvent>(&self) -> usize {
        let subscriptions = self.subscriptions.read().await;
        subscriptions
            .get(std::any::type_name::<E>())
            .map_or(0, Vec::len)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError> {
        let event_type_name = event.event_type_name();

        // Clone the list so handlers may publish or subscribe without deadlocking.
        let subscriptions = {
            let subscriptions = self.subscriptions.read().await;
            subscriptions
                .get(event_type_name)
                .cloned()
                .unwrap_or_default()
        };

        debug!(
            event_type = event_type_name,
            handlers = subscriptions.len(),
            "Publishing event"
        );

        for subscription in subscriptions {
            if let Err(e) = subscription.deliver(&*event).await {
                error!(event_type = event_type_name, error = %e, "Event handler failed");
            }
        }

        Ok(())
    }
}
