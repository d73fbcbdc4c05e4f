use chrono::{Duration, FixedOffset, TimeZone};
use futures::StreamExt;
use std::sync::Arc;

use vanmastaren_domain::shared::{DomainError, HabitId};
use vanmastaren_infrastructure::Database;
use vanmastaren_lib::application::clock::FixedClock;
use vanmastaren_lib::application::commands::habit_commands::*;
use vanmastaren_lib::application::commands::CommandHandler;
use vanmastaren_lib::application::services::ConfigService;
use vanmastaren_lib::presentation::bootstrap::assemble_app_state;
use vanmastaren_lib::presentation::state::AppState;

async fn setup() -> (AppState, Arc<FixedClock>, tempfile::TempDir) {
    let temp = tempfile::tempdir().expect("Create temp dir");
    let config =
        Arc::new(ConfigService::load(&temp.path().join("config.json")).expect("Load config"));

    let start = FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 10, 7, 30, 0)
        .unwrap();
    let clock = Arc::new(FixedClock::new(start));

    let database = Database::in_memory().await.expect("Open in-memory db");
    let state = assemble_app_state(database, clock.clone(), config)
        .await
        .expect("Assemble app state");

    (state, clock, temp)
}

async fn toggle(state: &AppState, habit_id: &str) -> ToggleCompletionResult {
    state
        .command_handlers
        .toggle_completion
        .handle(ToggleCompletionCommand {
            habit_id: habit_id.to_string(),
        })
        .await
        .expect("Toggle habit")
}

#[tokio::test]
async fn habit_streak_follows_the_calendar() {
    let (state, clock, _temp) = setup().await;

    let created = state
        .command_handlers
        .create_habit
        .handle(CreateHabitCommand {
            name: "Read Book".to_string(),
            completed_today: false,
        })
        .await
        .expect("Create habit");
    let id = created.habit.id.clone();
    assert_eq!(created.habit.streak, 0);

    let day_one = toggle(&state, &id).await.habit;
    assert!(day_one.is_completed_today);
    assert_eq!(day_one.streak, 1);

    // Next morning: yesterday still counts, today is open.
    clock.advance(Duration::days(1));
    let habits = state.queries.habit.list_habits().await.expect("List");
    assert_eq!(habits.len(), 1);
    assert!(!habits[0].is_completed_today);
    assert_eq!(habits[0].streak, 1);

    let day_two = toggle(&state, &id).await.habit;
    assert_eq!(day_two.streak, 2);
    assert_eq!(day_two.total_days, 2);

    // Two days skipped.
    clock.advance(Duration::days(3));
    let habits = state.queries.habit.list_habits().await.expect("List");
    assert_eq!(habits[0].streak, 0);
    state.shutdown().await;

    let stored = state
        .repositories
        .habit
        .find_by_id(&HabitId::from_string(&id))
        .await
        .expect("Find habit")
        .expect("Habit exists");
    assert_eq!(stored.streak(), 0);
    assert!(!stored.is_completed_today());

    let stats = state.queries.habit.streak_stats(&id).await.expect("Stats");
    assert_eq!(stats.current_streak, 0);
    assert_eq!(stats.longest_streak, 2);
    assert_eq!(stats.completed_days, 2);
}

#[tokio::test]
async fn snapshot_feed_tracks_commands() {
    let (state, _clock, _temp) = setup().await;
    let mut snapshots = Box::pin(state.services.snapshot_feed.subscribe());
    assert!(snapshots.next().await.expect("Initial snapshot").is_empty());

    let created = state
        .command_handlers
        .create_habit
        .handle(CreateHabitCommand {
            name: "Run".to_string(),
            completed_today: true,
        })
        .await
        .expect("Create habit");

    let after_create = snapshots.next().await.expect("Snapshot after create");
    assert_eq!(after_create.len(), 1);
    assert_eq!(after_create[0].streak, 1);

    state
        .command_handlers
        .rename_habit
        .handle(RenameHabitCommand {
            habit_id: created.habit.id.clone(),
            name: "Run 5k".to_string(),
        })
        .await
        .expect("Rename habit");
    let after_rename = snapshots.next().await.expect("Snapshot after rename");
    assert_eq!(after_rename[0].name, "Run 5k");

    state
        .command_handlers
        .delete_habit
        .handle(DeleteHabitCommand {
            habit_id: created.habit.id.clone(),
        })
        .await
        .expect("Delete habit");
    let after_delete = snapshots.next().await.expect("Snapshot after delete");
    assert!(after_delete.is_empty());
    assert!(state.services.snapshot_feed.latest().is_empty());
}

#[tokio::test]
async fn unknown_habit_is_reported() {
    let (state, _clock, _temp) = setup().await;

    let result = state
        .command_handlers
        .toggle_completion
        .handle(ToggleCompletionCommand {
            habit_id: "does-not-exist".to_string(),
        })
        .await;

    assert!(matches!(result, Err(DomainError::HabitNotFound(_))));
}
