use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::application::services::HabitSnapshotFeed;
use vanmastaren_domain::events::event_bus::EventHandler;
use vanmastaren_domain::events::habit_events::*;
use vanmastaren_domain::shared::DomainError;

/// Handler for habit lifecycle events that push a fresh snapshot to feed
/// subscribers. Keeps the command handlers unaware of the feed.
///
/// Not registered for `HabitStreakCorrected`: corrections come from a refresh
/// pass, and reacting to them would start another one.
#[derive(Clone)]
pub struct SnapshotRefreshEventHandler {
    feed: Arc<HabitSnapshotFeed>,
}

impl SnapshotRefreshEventHandler {
    pub fn new(feed: Arc<HabitSnapshotFeed>) -> Self {
        Self { feed }
    }

    async fn republish(&self) -> Result<(), DomainError> {
        let snapshot = self.feed.publish_latest().await;
        info!(habits = snapshot.len(), "Habit snapshot republished");
        Ok(())
    }
}

#[async_trait]
impl EventHandler<HabitCreated> for SnapshotRefreshEventHandler {
    async fn handle(&self, event: &HabitCreated) -> Result<(), DomainError> {
        info!(
            "Handling HabitCreated event for habit: {} ({})",
            event.name, event.habit_id
        );
        self.republish().await
    }
}

#[async_trait]
impl EventHandler<HabitCompletionToggled> for SnapshotRefreshEventHandler {
    async fn handle(&self, event: &HabitCompletionToggled) -> Result<(), DomainError> {
        info!(
            "Handling HabitCompletionToggled event for habit: {}",
            event.habit_id
        );
        self.republish().await
    }
}

#[async_trait]
impl EventHandler<HabitRenamed> for SnapshotRefreshEventHandler {
    async fn handle(&self, event: &HabitRenamed) -> Result<(), DomainError> {
        info!("Handling HabitRenamed event for habit: {}", event.habit_id);
        self.republish().await
    }
}

#[async_trait]
impl EventHandler<HabitDeleted> for SnapshotRefreshEventHandler {
    async fn handle(&self, event: &HabitDeleted) -> Result<(), DomainError> {
        info!(
            "Handling HabitDeleted event for habit: {} ({})",
            event.name, event.habit_id
        );
        self.republish().await
    }
}
