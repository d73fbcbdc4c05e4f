use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::habit_commands::*;
use crate::application::dtos::HabitDto;
use crate::application::services::HabitLocks;
use vanmastaren_domain::events::habit_events::HabitRenamed;
use vanmastaren_domain::events::EventBus;
use vanmastaren_domain::habit::HabitRepository;
use vanmastaren_domain::shared::{DomainError, HabitId};

pub struct RenameHabitCommandHandler {
    habit_repo: Arc<dyn HabitRepository>,
    event_bus: Arc<dyn EventBus>,
    locks: Arc<HabitLocks>,
}

impl RenameHabitCommandHandler {
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
impl CommandHandler<RenameHabitCommand> for RenameHabitCommandHandler {
    type Result = RenameHabitResult;

    async fn handle(&self, cmd: RenameHabitCommand) -> Result<Self::Result, DomainError> {
        info!("Handling RenameHabitCommand for habit: {}", cmd.habit_id);

        let habit_id = HabitId::from_string(&cmd.habit_id);
        let guard = self.locks.acquire(&habit_id).await;

        let mut habit = self
            .habit_repo
            .find_by_id(&habit_id)
            .await?
            .ok_or_else(|| DomainError::HabitNotFound(cmd.habit_id.clone()))?;

        habit.rename(cmd.name)?;
        self.habit_repo.save(&habit).await?;
        drop(guard);

        let event = HabitRenamed {
            habit_id: habit.id().clone(),
            name: habit.name().to_string(),
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.event_bus.publish(Box::new(event)).await {
            warn!("Failed to publish HabitRenamed event: {}", e);
        }

        Ok(RenameHabitResult {
            habit: HabitDto::from(&habit),
        })
    }
}
