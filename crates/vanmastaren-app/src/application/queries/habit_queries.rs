use std::sync::Arc;

use crate::application::clock::Clock;
use crate::application::dtos::{HabitDto, HabitStreakDto};
use crate::application::services::HabitRefresher;
use vanmastaren_domain::habit::Habit;
use vanmastaren_domain::shared::{DomainError, HabitId};

/// Habit query service
/// Every read goes through a refresh so derived fields match the current day.
pub struct HabitQueryService {
    refresher: Arc<HabitRefresher>,
    clock: Arc<dyn Clock>,
}

impl HabitQueryService {
    pub fn new(refresher: Arc<HabitRefresher>, clock: Arc<dyn Clock>) -> Self {
        Self { refresher, clock }
    }

    /// All habits in creation order. An unreachable store reads as empty.
    pub async fn list_habits(&self) -> Result<Vec<HabitDto>, DomainError> {
        let outcome = self.refresher.refresh_all().await;
        Ok(outcome.habits.iter().map(HabitDto::from).collect())
    }

    pub async fn get_habit(&self, habit_id: &str) -> Result<HabitDto, DomainError> {
        let habit = self.load(habit_id).await?;
        Ok(HabitDto::from(&habit))
    }

    pub async fn streak_stats(&self, habit_id: &str) -> Result<HabitStreakDto, DomainError> {
        let habit = self.load(habit_id).await?;
        Ok(self.to_streak_dto(&habit))
    }

    /// Statistics for every habit, longest current streak first.
    pub async fn all_streak_stats(&self) -> Result<Vec<HabitStreakDto>, DomainError> {
        let outcome = self.refresher.refresh_all().await;

        let mut stats: Vec<HabitStreakDto> = outcome
            .habits
            .iter()
            .map(|habit| self.to_streak_dto(habit))
            .collect();

        stats.sort_by(|a, b| {
            b.current_streak
                .cmp(&a.current_streak)
                .then_with(|| a.habit_name.cmp(&b.habit_name))
        });

        Ok(stats)
    }

    async fn load(&self, habit_id: &str) -> Result<Habit, DomainError> {
        self.refresher
            .refresh_one(&HabitId::from_string(habit_id))
            .await?
            .ok_or_else(|| DomainError::HabitNotFound(habit_id.to_string()))
    }

    fn to_streak_dto(&self, habit: &Habit) -> HabitStreakDto {
        let stats = habit.streak_stats(&self.clock.now());

        HabitStreakDto {
            habit_id: habit.id().to_string(),
            habit_name: habit.name().to_string(),
            current_streak: stats.current_streak,
            longest_streak: stats.longest_streak,
            completed_days: stats.completed_days,
            total_days: habit.total_days(),
            last_completion_date: stats
                .last_completion_date
                .map(|date| date.format("%Y-%m-%d").to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{HabitLocks, WriteFailureNotifier};
    use crate::application::test_support::{
        fixed_clock, local_time, MockHabitRepository, RecordingEventBus,
    };
    use chrono::{Duration, Utc};

    async fn service_with(habits: Vec<Habit>) -> HabitQueryService {
        let repo = Arc::new(MockHabitRepository::new());
        for habit in habits {
            repo.insert(habit).await;
        }
        let clock = fixed_clock(local_time(2024, 5, 10, 21, 0));
        let refresher = HabitRefresher::new(
            repo,
            Arc::new(HabitLocks::new()),
            clock.clone(),
            Arc::new(RecordingEventBus::new()),
            WriteFailureNotifier::default(),
            4,
        );
        HabitQueryService::new(Arc::new(refresher), clock)
    }

    /// Completed on each of the given days before 2024-05-10 (0 = today).
    fn habit_completed(name: &str, days_ago: &[i64]) -> Habit {
        let today = local_time(2024, 5, 10, 8, 0).with_timezone(&Utc);
        let mut dates: Vec<_> = days_ago.iter().map(|d| today - Duration::days(*d)).collect();
        dates.sort();
        Habit::restore(
            HabitId::new(),
            name.to_string(),
            0,
            false,
            dates.len() as u32,
            dates,
            today - Duration::days(30),
        )
    }

    #[tokio::test]
    async fn test_get_habit_applies_refresh() {
        let habit = habit_completed("Read", &[0, 1, 2]);
        let id = habit.id().to_string();
        let service = service_with(vec![habit]).await;

        let dto = service.get_habit(&id).await.unwrap();

        assert_eq!(dto.streak, 3);
        assert!(dto.is_completed_today);
    }

    #[tokio::test]
    async fn test_get_missing_habit() {
        let service = service_with(Vec::new()).await;

        let result = service.get_habit("missing").await;

        assert!(matches!(result, Err(DomainError::HabitNotFound(_))));
    }

    #[tokio::test]
    async fn test_streak_stats_for_habit() {
        let habit = habit_completed("Run", &[1, 2, 5, 6, 7, 8]);
        let id = habit.id().to_string();
        let service = service_with(vec![habit]).await;

        let stats = service.streak_stats(&id).await.unwrap();

        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 4);
        assert_eq!(stats.completed_days, 6);
        assert_eq!(stats.last_completion_date.as_deref(), Some("2024-05-09"));
    }

    #[tokio::test]
    async fn test_all_streak_stats_sorted_by_current_streak() {
        let service = service_with(vec![
            habit_completed("Floss", &[3]),
            habit_completed("Walk", &[0, 1, 2, 3]),
            habit_completed("Read", &[0]),
        ])
        .await;

        let stats = service.all_streak_stats().await.unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.habit_name.as_str()).collect();

        assert_eq!(names, vec!["Walk", "Read", "Floss"]);
        assert_eq!(stats[2].current_streak, 0);
    }

    #[tokio::test]
    async fn test_list_habits_empty_store() {
        let service = service_with(Vec::new()).await;

        assert!(service.list_habits().await.unwrap().is_empty());
    }
}
