use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::{HabitLocks, WriteFailure, WriteFailureNotifier};
use crate::application::clock::Clock;
use vanmastaren_domain::events::habit_events::HabitStreakCorrected;
use vanmastaren_domain::events::EventBus;
use vanmastaren_domain::habit::{CalendarZone, Habit, HabitRefresh, HabitRepository};
use vanmastaren_domain::shared::{DomainError, HabitId};

/// Result of one pass over the store.
#[derive(Debug, Default)]
pub struct RefreshOutcome {
    /// Every habit that could be read, with derived fields current, in
    /// creation order.
    pub habits: Vec<Habit>,
    /// Habits whose derived fields were corrected and queued for writing.
    pub corrected: usize,
    /// Habits that could not be read.
    pub skipped: usize,
}

/// Loads every habit, re-derives its streak and completion flag for the
/// current moment, and writes corrections back in the background.
pub struct HabitRefresher {
    habit_repo: Arc<dyn HabitRepository>,
    locks: Arc<HabitLocks>,
    clock: Arc<dyn Clock>,
    event_bus: Arc<dyn EventBus>,
    failures: WriteFailureNotifier,
    max_parallel: usize,
    pending_writes: Mutex<Vec<JoinHandle<()>>>,
}

impl HabitRefresher {
    pub fn new(
        habit_repo: Arc<dyn HabitRepository>,
        locks: Arc<HabitLocks>,
        clock: Arc<dyn Clock>,
        event_bus: Arc<dyn EventBus>,
        failures: WriteFailureNotifier,
        max_parallel: usize,
    ) -> Self {
        Self {
            habit_repo,
            locks,
            clock,
            event_bus,
            failures,
            max_parallel: max_parallel.max(1),
            pending_writes: Mutex::new(Vec::new()),
        }
    }

    /// Wait for every correction write started so far. Call before exiting so
    /// queued writes are not lost with the runtime.
    pub async fn flush_pending_writes(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending_writes.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *pending)
        };

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Correction write task failed");
            }
        }
    }

    /// Fan out one read per habit (at most `max_parallel` at a time) and join
    /// them all before returning. A failed listing yields an empty set; a failed
    /// read skips that habit only.
    #[instrument(skip(self), fields(max_parallel = self.max_parallel))]
    pub async fn refresh_all(&self) -> RefreshOutcome {
        let now = self.clock.now();

        let ids = match self.habit_repo.list_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to list habits, treating as empty");
                return RefreshOutcome::default();
            }
        };

        let total = ids.len();
        let results: Vec<Result<Option<(Habit, HabitRefresh)>, DomainError>> = stream::iter(ids)
            .map(|id| self.refresh_locked(id, now))
            .buffer_unordered(self.max_parallel)
            .collect()
            .await;

        let mut outcome = RefreshOutcome::default();
        for result in results {
            match result {
                Ok(Some((habit, refresh))) => {
                    if refresh.is_changed() {
                        outcome.corrected += 1;
                    }
                    outcome.habits.push(habit);
                }
                // Deleted between listing and reading.
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Skipping habit that could not be read");
                    outcome.skipped += 1;
                }
            }
        }

        outcome
            .habits
            .sort_by(|a, b| (a.created_at(), a.id()).cmp(&(b.created_at(), b.id())));

        info!(
            total,
            loaded = outcome.habits.len(),
            corrected = outcome.corrected,
            skipped = outcome.skipped,
            "Refresh pass finished"
        );

        outcome
    }

    /// Refresh a single habit. `Ok(None)` when it does not exist.
    pub async fn refresh_one(&self, id: &HabitId) -> Result<Option<Habit>, DomainError> {
        let now = self.clock.now();
        Ok(self
            .refresh_locked(id.clone(), now)
            .await?
            .map(|(habit, _)| habit))
    }

    async fn refresh_locked(
        &self,
        id: HabitId,
        now: DateTime<CalendarZone>,
    ) -> Result<Option<(Habit, HabitRefresh)>, DomainError> {
        let guard = self.locks.acquire(&id).await;

        let Some(mut habit) = self.habit_repo.find_by_id(&id).await? else {
            debug!(habit_id = %id, "Habit disappeared before refresh");
            return Ok(None);
        };

        let refresh = habit.refresh(&now);
        if refresh.is_changed() {
            self.persist_correction(habit.clone(), refresh, guard);
        }

        Ok(Some((habit, refresh)))
    }

    /// Write a corrected habit without making the caller wait. The habit's lock
    /// stays held until the write finishes.
    fn persist_correction(&self, habit: Habit, refresh: HabitRefresh, guard: OwnedMutexGuard<()>) {
        let habit_repo = self.habit_repo.clone();
        let event_bus = self.event_bus.clone();
        let failures = self.failures.clone();

        let handle = tokio::spawn(async move {
            let _guard = guard;

            if let Err(e) = habit_repo.save(&habit).await {
                failures.notify(WriteFailure {
                    habit_id: habit.id().clone(),
                    operation: "persist_correction",
                    retryable: e.is_recoverable(),
                    message: e.to_string(),
                    occurred_at: Utc::now(),
                });
                return;
            }

            let (previous_streak, streak) = refresh
                .streak_corrected
                .unwrap_or((habit.streak(), habit.streak()));

            info!(
                habit_id = %habit.id(),
                previous_streak,
                streak,
                flag_reset = refresh.flag_reset,
                "Habit derived fields corrected"
            );

            let event = HabitStreakCorrected {
                habit_id: habit.id().clone(),
                previous_streak,
                streak,
                flag_reset: refresh.flag_reset,
                occurred_at: Utc::now(),
            };
            if let Err(e) = event_bus.publish(Box::new(event)).await {
                warn!(error = %e, "Failed to publish HabitStreakCorrected");
            }
        });

        let mut pending = self.pending_writes.lock().unwrap_or_else(|e| e.into_inner());
        pending.retain(|task| !task.is_finished());
        pending.push(handle);
    }
}
