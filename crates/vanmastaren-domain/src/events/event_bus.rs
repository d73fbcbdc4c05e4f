use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

use super::DomainEvent;
use crate::shared::DomainError;

/// Publishes habit events to whoever subscribed to them.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError>;
}

#[async_trait]
pub trait EventHandler<E: DomainEvent>: Send + Sync {
    async fn handle(&self, event: &E) -> Result<(), DomainError>;
}

/// A handler bound to the one event type it accepts.
///
/// Subscriptions for different event types can sit in the same collection; the
/// bus routes by [`Subscription::event_type`] and the subscription downcasts
/// back to the concrete event before calling the handler.
#[derive(Clone)]
pub struct Subscription {
    event_type: &'static str,
    handler: Arc<dyn DeliverEvent>,
}

impl Subscription {
    pub fn new<E, H>(handler: H) -> Self
    where
        E: DomainEvent,
        H: EventHandler<E> + 'static,
    {
        Self {
            event_type: std::any::type_name::<E>(),
            handler: Arc::new(Bound {
                handler,
                _event: PhantomData::<fn(E)>,
            }),
        }
    }

    /// Matches [`DomainEvent::event_type_name`] of the events this accepts.
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }

    pub async fn deliver(&self, event: &dyn DomainEvent) -> Result<(), DomainError> {
        self.handler.deliver(event).await
    }
}

#[async_trait]
trait DeliverEvent: Send + Sync {
    async fn deliver(&self, event: &dyn DomainEvent) -> Result<(), DomainError>;
}

struct Bound<E, H> {
    handler: H,
    _event: PhantomData<fn(E)>,
}

#[async_trait]
impl<E, H> DeliverEvent for Bound<E, H>
where
    E: DomainEvent,
    H: EventHandler<E>,
{
    async fn deliver(&self, event: &dyn DomainEvent) -> Result<(), DomainError> {
        let Some(typed) = event.as_any().downcast_ref::<E>() else {
            return Err(DomainError::Infrastructure(format!(
                "{} delivered to a handler for {}",
                event.event_type_name(),
                std::any::type_name::<E>()
            )));
        };
        self.handler.handle(typed).await
    }
}
