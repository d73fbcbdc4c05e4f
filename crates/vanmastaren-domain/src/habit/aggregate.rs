use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::streak::{calendar_day, compute_streak, streak_stats, StreakStats};
use crate::shared::{DomainError, HabitId};

/// Outcome of re-deriving a habit's derived fields for a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HabitRefresh {
    /// `is_completed_today` changed.
    pub flag_reset: bool,
    /// Previous and corrected streak, when the stored value was wrong.
    pub streak_corrected: Option<(u32, u32)>,
}

impl HabitRefresh {
    pub fn is_changed(&self) -> bool {
        self.flag_reset || self.streak_corrected.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    id: HabitId,
    name: String,
    streak: u32,
    is_completed_today: bool,
    total_days: u32,
    completion_dates: Vec<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(
        name: String,
        completed_today: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = Self::validate_name(name)?;

        // A single completion on the creation day is a streak of one.
        let (completion_dates, total_days, streak) = if completed_today {
            (vec![now], 1, 1)
        } else {
            (Vec::new(), 0, 0)
        };

        Ok(Self {
            id: HabitId::new(),
            name,
            streak,
            is_completed_today: completed_today,
            total_days,
            completion_dates,
            created_at: now,
        })
    }

    /// Rebuild a habit from persisted state. Derived fields are taken as stored;
    /// call [`Habit::refresh`] to correct them.
    pub fn restore(
        id: HabitId,
        name: String,
        streak: u32,
        is_completed_today: bool,
        total_days: u32,
        mut completion_dates: Vec<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        completion_dates.sort();

        Self {
            id,
            name,
            streak,
            is_completed_today,
            total_days,
            completion_dates,
            created_at,
        }
    }

    pub fn id(&self) -> &HabitId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn is_completed_today(&self) -> bool {
        self.is_completed_today
    }

    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    pub fn completion_dates(&self) -> &[DateTime<Utc>] {
        &self.completion_dates
    }

    pub fn last_completion(&self) -> Option<DateTime<Utc>> {
        self.completion_dates.last().copied()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn rename(&mut self, name: String) -> Result<(), DomainError> {
        self.name = Self::validate_name(name)?;
        Ok(())
    }

    /// Mark the habit done for today, or undo today's completion when it is
    /// already marked. The streak is recomputed afterwards.
    pub fn toggle_completion<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        if self.is_completed_today {
            self.is_completed_today = false;
            self.completion_dates.pop();
            self.total_days = self.total_days.saturating_sub(1);
        } else {
            self.is_completed_today = true;
            self.completion_dates.push(now.with_timezone(&Utc));
            self.total_days += 1;
        }

        self.recompute_streak(now);
    }

    /// Align `is_completed_today` with the calendar day of `now`.
    /// Returns whether the flag changed.
    pub fn reset_if_stale<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> bool {
        let today = now.date_naive();
        let tz = now.timezone();
        let completed = self
            .completion_dates
            .last()
            .is_some_and(|last| calendar_day(last, &tz) == today);

        let changed = completed != self.is_completed_today;
        self.is_completed_today = completed;
        changed
    }

    /// Overwrite `streak` with the value derived from the completion history.
    /// Returns the previous value when it differed.
    pub fn recompute_streak<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Option<u32> {
        let computed = compute_streak(&self.completion_dates, now.date_naive(), &now.timezone());
        if computed == self.streak {
            return None;
        }

        let previous = self.streak;
        self.streak = computed;
        Some(previous)
    }

    /// Daily reset followed by streak recomputation. Idempotent for a given day.
    pub fn refresh<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> HabitRefresh {
        let flag_reset = self.reset_if_stale(now);
        let streak_corrected = self
            .recompute_streak(now)
            .map(|previous| (previous, self.streak));

        HabitRefresh {
            flag_reset,
            streak_corrected,
        }
    }

    pub fn streak_stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> StreakStats {
        streak_stats(&self.completion_dates, now.date_naive(), &now.timezone())
    }

    fn validate_name(name: String) -> Result<String, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation(
                "Habit name cannot be empty".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }
}
