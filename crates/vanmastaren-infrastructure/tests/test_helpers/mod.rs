use sqlx::SqlitePool;
use std::sync::Arc;

use vanmastaren_infrastructure::Database;

/// Fresh in-memory database with migrations applied.
pub async fn setup_in_memory_db() -> Arc<SqlitePool> {
    let db = Database::in_memory().await.expect("Open in-memory database");
    db.run_migrations().await.expect("Run migrations");
    Arc::new(db.pool().clone())
}
