use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vanmastaren_domain::habit::Habit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitDto {
    pub id: String,
    pub name: String,
    pub streak: u32,
    pub is_completed_today: bool,
    pub total_days: u32,
    pub completion_dates: Vec<DateTime<Utc>>,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Habit> for HabitDto {
    fn from(habit: &Habit) -> Self {
        Self {
            id: habit.id().to_string(),
            name: habit.name().to_string(),
            streak: habit.streak(),
            is_completed_today: habit.is_completed_today(),
            total_days: habit.total_days(),
            completion_dates: habit.completion_dates().to_vec(),
            last_completed_at: habit.last_completion(),
            created_at: habit.created_at(),
        }
    }
}
