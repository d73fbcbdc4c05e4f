use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::persistence::RepositoryErrorMapper;
use vanmastaren_domain::habit::{Habit, HabitDocument, HabitRepository};
use vanmastaren_domain::shared::{DomainError, HabitId};

#[derive(FromRow)]
struct HabitRow {
    id: String,
    document: String,
    created_at: DateTime<Utc>,
}

impl HabitRow {
    /// A document that is not valid JSON decodes as an empty one; individual
    /// fields are defaulted by `HabitDocument::from_value`.
    fn into_habit(self) -> Habit {
        let value = serde_json::from_str::<Value>(&self.document).unwrap_or_else(|e| {
            warn!(habit_id = %self.id, error = %e, "Stored habit document is not valid JSON");
            Value::Null
        });

        HabitDocument::from_value(&value).into_habit(HabitId::from_string(&self.id), self.created_at)
    }
}

pub struct SqliteHabitRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteHabitRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HabitRepository for SqliteHabitRepository {
    async fn find_all(&self) -> Result<Vec<Habit>, DomainError> {
        let start = Instant::now();
        let query = "SELECT id, document, created_at FROM habits ORDER BY created_at ASC, id ASC";

        let rows: Vec<HabitRow> = sqlx::query_as(query)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Find all habits"))?;

        debug!(
            count = rows.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "find_all habits"
        );

        Ok(rows.into_iter().map(HabitRow::into_habit).collect())
    }

    async fn list_ids(&self) -> Result<Vec<HabitId>, DomainError> {
        let query = "SELECT id FROM habits ORDER BY created_at ASC, id ASC";

        let ids: Vec<String> = sqlx::query_scalar(query)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "List habit ids"))?;

        Ok(ids.iter().map(|id| HabitId::from_string(id)).collect())
    }

    async fn find_by_id(&self, id: &HabitId) -> Result<Option<Habit>, DomainError> {
        let query = "SELECT id, document, created_at FROM habits WHERE id = ?1";

        let row: Option<HabitRow> = sqlx::query_as(query)
            .bind(id.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Find habit by ID"))?;

        Ok(row.map(HabitRow::into_habit))
    }

    async fn save(&self, habit: &Habit) -> Result<(), DomainError> {
        let start = Instant::now();
        let query = r#"
            INSERT INTO habits (id, document, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                document = ?2,
                updated_at = ?4
        "#;

        let document = serde_json::to_string(&HabitDocument::from_habit(habit))
            .map_err(|e| RepositoryErrorMapper::map_json_error(e, "Encode habit document"))?;

        sqlx::query(query)
            .bind(habit.id().as_str())
            .bind(document)
            .bind(habit.created_at())
            .bind(Utc::now())
            .execute(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Save habit"))?;

        debug!(
            habit_id = %habit.id(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Habit saved"
        );

        Ok(())
    }

    async fn delete(&self, id: &HabitId) -> Result<(), DomainError> {
        let query = "DELETE FROM habits WHERE id = ?1";

        let result = sqlx::query(query)
            .bind(id.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| RepositoryErrorMapper::map_sqlx_error(e, "Delete habit"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::HabitNotFound(id.to_string()));
        }

        debug!(habit_id = %id, "Habit deleted");
        Ok(())
    }
}
