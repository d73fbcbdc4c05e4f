use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::clock::{Clock, SystemClock};
use crate::application::commands::handlers::*;
use crate::application::event_handlers::SnapshotRefreshEventHandler;
use crate::application::queries::HabitQueryService;
use crate::application::services::{
    ConfigService, HabitLocks, HabitRefresher, HabitSnapshotFeed, WriteFailureNotifier,
};
use crate::presentation::state::{
    AppState, CommandHandlers, Queries, Repositories, Runtime, Services,
};
use vanmastaren_domain::events::habit_events::*;
use vanmastaren_domain::events::Subscription;
use vanmastaren_domain::habit::HabitRepository;
use vanmastaren_infrastructure::events::InMemoryEventBus;
use vanmastaren_infrastructure::persistence::repositories::SqliteHabitRepository;
use vanmastaren_infrastructure::Database;

/// Open the configured database and wire every service against the wall clock.
pub async fn build_app_state(config: Arc<ConfigService>) -> anyhow::Result<AppState> {
    let db_path = config.config().database_path.clone();
    let db_path_str = db_path
        .to_str()
        .with_context(|| format!("Invalid database path: {}", db_path.display()))?;

    info!("Database path: {}", db_path_str);

    info!("🔌 Connecting to database...");
    let started_at = Instant::now();
    let database = Database::new(db_path_str).await?;
    info!(
        "✓ Database connection established ({}ms)",
        started_at.elapsed().as_millis()
    );

    assemble_app_state(database, Arc::new(SystemClock), config).await
}

/// Wire services on top of an open database. Runs migrations, registers event
/// handlers and publishes the first snapshot.
pub async fn assemble_app_state(
    database: Database,
    clock: Arc<dyn Clock>,
    config: Arc<ConfigService>,
) -> anyhow::Result<AppState> {
    let startup_started_at = Instant::now();

    info!("🔄 Running migrations...");
    let started_at = Instant::now();
    database.run_migrations().await?;
    info!(
        "✓ Migrations completed ({}ms)",
        started_at.elapsed().as_millis()
    );

    let pool = Arc::new(database.pool().clone());
    let habit_repo =
        Arc::new(SqliteHabitRepository::new(pool)) as Arc<dyn HabitRepository>;

    let event_bus = Arc::new(InMemoryEventBus::new());
    let locks = Arc::new(HabitLocks::new());
    let write_failures = WriteFailureNotifier::default();

    let refresher = Arc::new(HabitRefresher::new(
        habit_repo.clone(),
        locks.clone(),
        clock.clone(),
        event_bus.clone(),
        write_failures.clone(),
        config.config().max_parallel_loads,
    ));
    let snapshot_feed = Arc::new(HabitSnapshotFeed::new(refresher.clone()));

    info!("🔧 Registering event handlers...");
    let snapshot_refresh_handler = SnapshotRefreshEventHandler::new(snapshot_feed.clone());

    for subscription in [
        Subscription::new::<HabitCreated, _>(snapshot_refresh_handler.clone()),
        Subscription::new::<HabitCompletionToggled, _>(snapshot_refresh_handler.clone()),
        Subscription::new::<HabitRenamed, _>(snapshot_refresh_handler.clone()),
        Subscription::new::<HabitDeleted, _>(snapshot_refresh_handler),
    ] {
        event_bus.subscribe(subscription).await;
    }

    info!("✓ Event handlers registered");

    let command_handlers = CommandHandlers {
        create_habit: Arc::new(CreateHabitCommandHandler::new(
            habit_repo.clone(),
            event_bus.clone(),
            clock.clone(),
        )),
        toggle_completion: Arc::new(ToggleCompletionCommandHandler::new(
            habit_repo.clone(),
            event_bus.clone(),
            locks.clone(),
            clock.clone(),
        )),
        rename_habit: Arc::new(RenameHabitCommandHandler::new(
            habit_repo.clone(),
            event_bus.clone(),
            locks.clone(),
        )),
        delete_habit: Arc::new(DeleteHabitCommandHandler::new(
            habit_repo.clone(),
            event_bus.clone(),
            locks.clone(),
        )),
    };

    let habit_queries = Arc::new(HabitQueryService::new(refresher.clone(), clock.clone()));

    info!("📋 Loading habits...");
    let started_at = Instant::now();
    let snapshot = snapshot_feed.publish_latest().await;
    info!(
        "✓ Loaded {} habits ({}ms)",
        snapshot.len(),
        started_at.elapsed().as_millis()
    );

    info!(
        "✅ AppState ready ({}ms)",
        startup_started_at.elapsed().as_millis()
    );

    Ok(AppState {
        runtime: Runtime {
            db: Arc::new(database),
            event_bus,
            clock,
        },
        repositories: Repositories { habit: habit_repo },
        services: Services {
            config,
            locks,
            refresher,
            snapshot_feed,
            write_failures,
        },
        queries: Queries {
            habit: habit_queries,
        },
        command_handlers,
    })
}
