use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Habit;
use crate::shared::HabitId;

/// Persisted layout of a habit record in the document store.
///
/// Field names and types are fixed by the stored data: `completionDates` holds
/// epoch seconds as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HabitDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub is_completed_today: bool,
    #[serde(default)]
    pub total_days: u32,
    #[serde(default)]
    pub completion_dates: Vec<f64>,
}

impl HabitDocument {
    /// Decode a stored document field by field. Missing or mistyped fields fall
    /// back to their defaults instead of rejecting the whole record, and dates
    /// that are not finite numbers are dropped.
    pub fn from_value(value: &Value) -> Self {
        let count = |key: &str| -> u32 {
            value
                .get(key)
                .and_then(|v| {
                    v.as_u64()
                        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                })
                .map(|n| n.min(u32::MAX as u64) as u32)
                .unwrap_or(0)
        };

        let completion_dates = value
            .get("completionDates")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_f64)
                    .filter(|secs| secs.is_finite())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            streak: count("streak"),
            is_completed_today: value
                .get("isCompletedToday")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            total_days: count("totalDays"),
            completion_dates,
        }
    }

    pub fn from_habit(habit: &Habit) -> Self {
        Self {
            name: habit.name().to_string(),
            streak: habit.streak(),
            is_completed_today: habit.is_completed_today(),
            total_days: habit.total_days(),
            completion_dates: habit
                .completion_dates()
                .iter()
                .map(datetime_to_epoch_seconds)
                .collect(),
        }
    }

    pub fn into_habit(self, id: HabitId, created_at: DateTime<Utc>) -> Habit {
        let completion_dates = self
            .completion_dates
            .into_iter()
            .filter_map(epoch_seconds_to_datetime)
            .collect();

        Habit::restore(
            id,
            self.name,
            self.streak,
            self.is_completed_today,
            self.total_days,
            completion_dates,
            created_at,
        )
    }
}

/// Millisecond precision is kept; finer fractions are rounded.
pub fn datetime_to_epoch_seconds(at: &DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

pub fn epoch_seconds_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let millis = (secs * 1000.0).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}
