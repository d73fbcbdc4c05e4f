use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::clock::Clock;
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::habit_commands::*;
use crate::application::dtos::HabitDto;
use crate::application::services::HabitLocks;
use vanmastaren_domain::events::habit_events::HabitCompletionToggled;
use vanmastaren_domain::events::EventBus;
use vanmastaren_domain::habit::HabitRepository;
use vanmastaren_domain::shared::{DomainError, HabitId};

pub struct ToggleCompletionCommandHandler {
    habit_repo: Arc<dyn HabitRepository>,
    event_bus: Arc<dyn EventBus>,
    locks: Arc<HabitLocks>,
    clock: Arc<dyn Clock>,
}

impl ToggleCompletionCommandHandler {
    pub fn new(
        habit_repo: Arc<dyn HabitRepository>,
        event_bus: Arc<dyn EventBus>,
        locks: Arc<HabitLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            habit_repo,
            event_bus,
            locks,
            clock,
        }
    }
}

#[async_trait]
impl CommandHandler<ToggleCompletionCommand> for ToggleCompletionCommandHandler {
    type Result = ToggleCompletionResult;

    async fn handle(&self, cmd: ToggleCompletionCommand) -> Result<Self::Result, DomainError> {
        let habit_id = HabitId::from_string(&cmd.habit_id);
        let guard = self.locks.acquire(&habit_id).await;

        let mut habit = self
            .habit_repo
            .find_by_id(&habit_id)
            .await?
            .ok_or_else(|| DomainError::HabitNotFound(cmd.habit_id.clone()))?;

        let now = self.clock.now();

        // Clear a flag left over from an earlier day before toggling.
        habit.refresh(&now);
        habit.toggle_completion(&now);

        self.habit_repo.save(&habit).await?;
        drop(guard);

        info!(
            "Habit {} toggled: completed_today={} streak={} total_days={}",
            habit.id(),
            habit.is_completed_today(),
            habit.streak(),
            habit.total_days()
        );

        let event = HabitCompletionToggled {
            habit_id: habit.id().clone(),
            completed_today: habit.is_completed_today(),
            streak: habit.streak(),
            total_days: habit.total_days(),
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.event_bus.publish(Box::new(event)).await {
            warn!("Failed to publish HabitCompletionToggled event: {}", e);
        }

        Ok(ToggleCompletionResult {
            habit: HabitDto::from(&habit),
        })
    }
}
