use async_trait::async_trait;

use super::Habit;
use crate::shared::{DomainError, HabitId};

#[async_trait]
pub trait HabitRepository: Send + Sync {
    /// Point-in-time list of every stored habit.
    async fn find_all(&self) -> Result<Vec<Habit>, DomainError>;

    /// Identifiers of every stored habit, without decoding the records.
    async fn list_ids(&self) -> Result<Vec<HabitId>, DomainError>;

    async fn find_by_id(&self, id: &HabitId) -> Result<Option<Habit>, DomainError>;

    /// Upsert by id.
    async fn save(&self, habit: &Habit) -> Result<(), DomainError>;

    async fn delete(&self, id: &HabitId) -> Result<(), DomainError>;
}
