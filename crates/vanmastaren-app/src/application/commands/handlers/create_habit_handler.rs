use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::clock::Clock;
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::habit_commands::*;
use crate::application::dtos::HabitDto;
use vanmastaren_domain::events::habit_events::HabitCreated;
use vanmastaren_domain::events::EventBus;
use vanmastaren_domain::habit::{Habit, HabitRepository};
use vanmastaren_domain::shared::DomainError;

/// Create habit command handler
pub struct CreateHabitCommandHandler {
    habit_repo: Arc<dyn HabitRepository>,
    event_bus: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
}

impl CreateHabitCommandHandler {
    pub fn new(
        habit_repo: Arc<dyn HabitRepository>,
        event_bus: Arc<dyn EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            habit_repo,
            event_bus,
            clock,
        }
    }
}

#[async_trait]
impl CommandHandler<CreateHabitCommand> for CreateHabitCommandHandler {
    type Result = CreateHabitResult;

    async fn handle(&self, cmd: CreateHabitCommand) -> Result<Self::Result, DomainError> {
        info!("Handling CreateHabitCommand for habit: {}", cmd.name);

        let now = self.clock.now().with_timezone(&Utc);
        let habit = Habit::new(cmd.name, cmd.completed_today, now)?;

        // A fresh id has no other writer, so no lock is taken.
        self.habit_repo.save(&habit).await?;

        info!(
            "Habit created: {} ({}) completed_today={}",
            habit.name(),
            habit.id(),
            habit.is_completed_today()
        );

        let event = HabitCreated {
            habit_id: habit.id().clone(),
            name: habit.name().to_string(),
            completed_today: habit.is_completed_today(),
            occurred_at: Utc::now(),
        };
        if let Err(e) = self.event_bus.publish(Box::new(event)).await {
            warn!("Failed to publish HabitCreated event: {}", e);
        }

        Ok(CreateHabitResult {
            habit: HabitDto::from(&habit),
        })
    }
}
