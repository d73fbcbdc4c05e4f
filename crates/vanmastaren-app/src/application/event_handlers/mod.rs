mod snapshot_refresh_handler;

pub use snapshot_refresh_handler::SnapshotRefreshEventHandler;
