mod config_service;
mod habit_locks;
mod refresh_pass;
mod snapshot_feed;
mod write_failures;

pub use config_service::{AppConfig, ConfigService, LogLevel, DB_PATH_ENV};
pub use habit_locks::HabitLocks;
pub use refresh_pass::{HabitRefresher, RefreshOutcome};
pub use snapshot_feed::HabitSnapshotFeed;
pub use write_failures::{WriteFailure, WriteFailureNotifier};
