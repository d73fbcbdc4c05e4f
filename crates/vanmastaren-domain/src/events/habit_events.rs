use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::events::DomainEvent;
use crate::shared::HabitId;

macro_rules! impl_domain_event {
    ($type:ty) => {
        impl DomainEvent for $type {
            fn as_any(&self) -> &(dyn Any + Send + Sync) {
                self
            }

            fn event_type_name(&self) -> &'static str {
                std::any::type_name::<Self>()
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitCreated {
    pub habit_id: HabitId,
    pub name: String,
    pub completed_today: bool,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(HabitCreated);

/// Fired after a completion was recorded or undone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitCompletionToggled {
    pub habit_id: HabitId,
    pub completed_today: bool,
    pub streak: u32,
    pub total_days: u32,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(HabitCompletionToggled);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitRenamed {
    pub habit_id: HabitId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(HabitRenamed);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitDeleted {
    pub habit_id: HabitId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(HabitDeleted);

/// Fired when a refresh pass found stale derived fields and wrote them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitStreakCorrected {
    pub habit_id: HabitId,
    pub previous_streak: u32,
    pub streak: u32,
    pub flag_reset: bool,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(HabitStreakCorrected);
