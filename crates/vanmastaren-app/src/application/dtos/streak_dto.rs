use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStreakDto {
    pub habit_id: String,
    pub habit_name: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub completed_days: u32,
    pub total_days: u32,
    pub last_completion_date: Option<String>, // YYYY-MM-DD
}
