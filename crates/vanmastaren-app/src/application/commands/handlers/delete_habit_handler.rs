use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::habit_commands::*;
use crate::application::services::HabitLocks;
use vanmastaren_domain::events::habit_events::HabitDeleted;
use vanmastaren_domain::events::EventBus;
use vanmastaren_domain::habit::HabitRepository;
use vanmastaren_domain::shared::{DomainError, HabitId};

/// Delete habit command handler
pub struct DeleteHabitCommandHandler {
    habit_repo: Arc<dyn HabitRepository>,
    event_bus: Arc<dyn EventBus>,
    locks: Arc<HabitLocks>,
}

impl DeleteHabitCommandHandler {
    pub fn new(
        habit_repo: Arc<dyn HabitRepository>,
        event_bus: Arc<dyn EventBus>,
        locks: Arc<HabitLocks>,
    ) -> Self {
        Self {
            habit_repo,
            event_bus,
            locks,
        }
    }
}

#[async_trait]
impl CommandHandler<DeleteHabitCommand> for DeleteHabitCommandHandler {
    type Result = DeleteHabitResult;

    async fn handle(&self, cmd: DeleteHabitCommand) -> Result<Self::Result, DomainError> {
        info!("Handling DeleteHabitCommand for habit: {}", cmd.habit_id);

        let habit_id = HabitId::from_string(&cmd.habit_id);
        let guard = self.locks.acquire(&habit_id).await;

        let habit = self
            .habit_repo
            .find_by_id(&habit_id)
            .await?
            .ok_or_else(|| DomainError::HabitNotFound(cmd.habit_id.clone()))?;

        self.habit_repo.delete(&habit_id).await?;
        drop(guard);
        self.locks.forget(&habit_id);

        info!("Habit deleted: {} ({})", habit.name(), habit_id);

        let event = HabitDeleted {
            habit_id,
            name: habit.name().to_string(),
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.event_bus.publish(Box::new(event)).await {
            warn!("Failed to publish HabitDeleted event: {}", e);
        }

        Ok(DeleteHabitResult { success: true })
    }
}
