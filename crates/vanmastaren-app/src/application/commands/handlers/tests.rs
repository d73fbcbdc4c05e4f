use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::application::clock::{Clock, FixedClock};
use crate::application::commands::command_handler::CommandHandler;
use crate::application::commands::habit_commands::*;
use crate::application::commands::handlers::*;
use crate::application::services::HabitLocks;
use crate::application::test_support::{
    fixed_clock, local_time, MockHabitRepository, RecordingEventBus,
};
use vanmastaren_domain::events::habit_events::*;
use vanmastaren_domain::habit::{Habit, HabitRepository};
use vanmastaren_domain::shared::{DomainError, HabitId};

mockall::mock! {
    pub FailingHabitRepository {}

    #[async_trait::async_trait]
    impl HabitRepository for FailingHabitRepository {
        async fn find_all(&self) -> Result<Vec<Habit>, DomainError>;
        async fn list_ids(&self) -> Result<Vec<HabitId>, DomainError>;
        async fn find_by_id(&self, id: &HabitId) -> Result<Option<Habit>, DomainError>;
        async fn save(&self, habit: &Habit) -> Result<(), DomainError>;
        async fn delete(&self, id: &HabitId) -> Result<(), DomainError>;
    }
}

struct Handlers {
    repo: Arc<MockHabitRepository>,
    bus: Arc<RecordingEventBus>,
    locks: Arc<HabitLocks>,
    clock: Arc<FixedClock>,
    create: CreateHabitCommandHandler,
    toggle: ToggleCompletionCommandHandler,
    rename: RenameHabitCommandHandler,
    delete: DeleteHabitCommandHandler,
}

fn handlers() -> Handlers {
    let repo = Arc::new(MockHabitRepository::new());
    let bus = Arc::new(RecordingEventBus::new());
    let locks = Arc::new(HabitLocks::new());
    let clock = fixed_clock(local_time(2024, 5, 10, 9, 0));

    Handlers {
        create: CreateHabitCommandHandler::new(repo.clone(), bus.clone(), clock.clone()),
        toggle: ToggleCompletionCommandHandler::new(
            repo.clone(),
            bus.clone(),
            locks.clone(),
            clock.clone(),
        ),
        rename: RenameHabitCommandHandler::new(repo.clone(), bus.clone(), locks.clone()),
        delete: DeleteHabitCommandHandler::new(repo.clone(), bus.clone(), locks.clone()),
        repo,
        bus,
        locks,
        clock,
    }
}

async fn create(h: &Handlers, name: &str, completed_today: bool) -> String {
    h.create
        .handle(CreateHabitCommand {
            name: name.to_string(),
            completed_today,
        })
        .await
        .unwrap()
        .habit
        .id
}

async fn toggle(h: &Handlers, habit_id: &str) -> Result<ToggleCompletionResult, DomainError> {
    h.toggle
        .handle(ToggleCompletionCommand {
            habit_id: habit_id.to_string(),
        })
        .await
}

// Tests

#[tokio::test]
async fn test_create_habit_command_handler() {
    let h = handlers();

    let result = h
        .create
        .handle(CreateHabitCommand {
            name: "  Read Book ".to_string(),
            completed_today: false,
        })
        .await
        .unwrap();

    assert_eq!(result.habit.name, "Read Book");
    assert_eq!(result.habit.streak, 0);
    assert_eq!(result.habit.total_days, 0);
    assert!(result.habit.completion_dates.is_empty());

    let saved = h
        .repo
        .find_by_id(&HabitId::from_string(&result.habit.id))
        .await
        .unwrap();
    assert!(saved.is_some());
    assert_eq!(h.bus.count_of::<HabitCreated>(), 1);
}

#[tokio::test]
async fn test_create_completed_habit_starts_streak() {
    let h = handlers();

    let result = h
        .create
        .handle(CreateHabitCommand {
            name: "Run".to_string(),
            completed_today: true,
        })
        .await
        .unwrap();

    assert_eq!(result.habit.streak, 1);
    assert_eq!(result.habit.total_days, 1);
    assert_eq!(
        result.habit.completion_dates,
        vec![h.clock.now().with_timezone(&Utc)]
    );
}

#[tokio::test]
async fn test_create_habit_with_empty_name_fails() {
    let h = handlers();

    let result = h
        .create
        .handle(CreateHabitCommand {
            name: "   ".to_string(),
            completed_today: false,
        })
        .await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert_eq!(h.repo.save_count(), 0);
    assert_eq!(h.bus.total(), 0);
}

#[tokio::test]
async fn test_toggle_on_then_off_restores_habit() {
    let h = handlers();
    let id = create(&h, "Meditate", false).await;

    let on = toggle(&h, &id).await.unwrap().habit;
    assert!(on.is_completed_today);
    assert_eq!(on.streak, 1);
    assert_eq!(on.total_days, 1);
    assert_eq!(on.completion_dates.len(), 1);

    let off = toggle(&h, &id).await.unwrap().habit;
    assert!(!off.is_completed_today);
    assert_eq!(off.streak, 0);
    assert_eq!(off.total_days, 0);
    assert!(off.completion_dates.is_empty());

    assert_eq!(h.bus.count_of::<HabitCompletionToggled>(), 2);
}

#[tokio::test]
async fn test_toggle_on_next_day_extends_streak() {
    let h = handlers();
    let id = create(&h, "Stretch", true).await;

    // The stored flag still says "done" when the next day starts.
    h.clock.advance(Duration::days(1));
    let result = toggle(&h, &id).await.unwrap().habit;

    assert!(result.is_completed_today);
    assert_eq!(result.streak, 2);
    assert_eq!(result.total_days, 2);
    assert_eq!(result.completion_dates.len(), 2);
}

#[tokio::test]
async fn test_toggle_missing_habit_fails() {
    let h = handlers();

    let result = toggle(&h, "missing").await;

    assert!(matches!(result, Err(DomainError::HabitNotFound(_))));
    assert_eq!(h.bus.total(), 0);
}

#[tokio::test]
async fn test_concurrent_toggles_on_one_habit_are_serialized() {
    let h = Arc::new(handlers());
    let id = create(&h, "Journal", false).await;
    h.repo
        .set_read_delay(std::time::Duration::from_millis(10));

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let h = h.clone();
        let id = id.clone();
        tasks.push(tokio::spawn(async move { toggle(&h, &id).await.unwrap() }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    // Four serialized toggles cancel out.
    let stored = h
        .repo
        .stored(&HabitId::from_string(&id))
        .await
        .unwrap();
    assert!(!stored.is_completed_today());
    assert_eq!(stored.total_days(), 0);
    assert!(stored.completion_dates().is_empty());
}

#[tokio::test]
async fn test_rename_habit_command_handler() {
    let h = handlers();
    let id = create(&h, "Read", false).await;

    let result = h
        .rename
        .handle(RenameHabitCommand {
            habit_id: id.clone(),
            name: " Read 20 pages ".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(result.habit.name, "Read 20 pages");
    assert_eq!(h.bus.count_of::<HabitRenamed>(), 1);

    let invalid = h
        .rename
        .handle(RenameHabitCommand {
            habit_id: id,
            name: String::new(),
        })
        .await;
    assert!(matches!(invalid, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_delete_habit_command_handler() {
    let h = handlers();
    let id = create(&h, "Floss", false).await;
    toggle(&h, &id).await.unwrap();
    assert_eq!(h.locks.len(), 1);

    let result = h
        .delete
        .handle(DeleteHabitCommand {
            habit_id: id.clone(),
        })
        .await
        .unwrap();

    assert!(result.success);
    assert!(h.repo.stored(&HabitId::from_string(&id)).await.is_none());
    assert!(h.locks.is_empty());
    assert_eq!(h.bus.count_of::<HabitDeleted>(), 1);
}

#[tokio::test]
async fn test_delete_missing_habit_fails() {
    let h = handlers();

    let result = h
        .delete
        .handle(DeleteHabitCommand {
            habit_id: "missing".to_string(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::HabitNotFound(_))));
}

#[tokio::test]
async fn test_toggle_save_failure_is_returned() {
    let now = local_time(2024, 5, 10, 9, 0);
    let habit = Habit::new("Run".to_string(), false, now.with_timezone(&Utc)).unwrap();
    let habit_id = habit.id().to_string();

    let mut repo = MockFailingHabitRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(Some(habit.clone())));
    repo.expect_save()
        .times(1)
        .returning(|_| Err(DomainError::Repository("disk full".to_string())));

    let bus = Arc::new(RecordingEventBus::new());
    let handler = ToggleCompletionCommandHandler::new(
        Arc::new(repo),
        bus.clone(),
        Arc::new(HabitLocks::new()),
        fixed_clock(now),
    );

    let result = handler
        .handle(ToggleCompletionCommand { habit_id })
        .await;

    assert!(matches!(result, Err(DomainError::Repository(_))));
    assert_eq!(bus.total(), 0);
}

#[tokio::test]
async fn test_create_save_failure_publishes_nothing() {
    let mut repo = MockFailingHabitRepository::new();
    repo.expect_save()
        .returning(|_| Err(DomainError::Repository("read-only store".to_string())));

    let bus = Arc::new(RecordingEventBus::new());
    let handler = CreateHabitCommandHandler::new(
        Arc::new(repo),
        bus.clone(),
        fixed_clock(local_time(2024, 5, 10, 9, 0)),
    );

    let result = handler
        .handle(CreateHabitCommand {
            name: "Walk".to_string(),
            completed_today: true,
        })
        .await;

    assert!(result.is_err());
    assert_eq!(bus.total(), 0);
}
