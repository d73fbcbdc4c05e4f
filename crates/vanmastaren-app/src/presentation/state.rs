use std::sync::Arc;

use crate::application::clock::Clock;
use crate::application::commands::handlers::*;
use crate::application::queries::HabitQueryService;
use crate::application::services::{
    ConfigService, HabitLocks, HabitRefresher, HabitSnapshotFeed, WriteFailureNotifier,
};
use vanmastaren_domain::events::EventBus;
use vanmastaren_domain::habit::HabitRepository;
use vanmastaren_infrastructure::Database;

/// Command handlers container
pub struct CommandHandlers {
    pub create_habit: Arc<CreateHabitCommandHandler>,
    pub toggle_completion: Arc<ToggleCompletionCommandHandler>,
    pub rename_habit: Arc<RenameHabitCommandHandler>,
    pub delete_habit: Arc<DeleteHabitCommandHandler>,
}

pub struct Runtime {
    pub db: Arc<Database>,
    pub event_bus: Arc<dyn EventBus>,
    pub clock: Arc<dyn Clock>,
}

pub struct Repositories {
    pub habit: Arc<dyn HabitRepository>,
}

pub struct Services {
    pub config: Arc<ConfigService>,
    pub locks: Arc<HabitLocks>,
    pub refresher: Arc<HabitRefresher>,
    pub snapshot_feed: Arc<HabitSnapshotFeed>,
    pub write_failures: WriteFailureNotifier,
}

pub struct Queries {
    pub habit: Arc<HabitQueryService>,
}

pub struct AppState {
    pub runtime: Runtime,
    pub repositories: Repositories,
    pub services: Services,
    pub queries: Queries,
    pub command_handlers: CommandHandlers,
}

impl AppState {
    pub async fn new(config: Arc<ConfigService>) -> anyhow::Result<Self> {
        crate::presentation::bootstrap::build_app_state(config).await
    }

    /// Let background correction writes finish.
    pub async fn shutdown(&self) {
        self.services.refresher.flush_pending_writes().await;
    }
}
