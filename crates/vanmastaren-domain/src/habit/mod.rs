mod aggregate;
mod calendar;
mod document;
mod repository;
pub mod streak;


pub use aggregate::{Habit, HabitRefresh};
pub use calendar::{CalendarOffset, CalendarZone};
pub use document::{datetime_to_epoch_seconds, epoch_seconds_to_datetime, HabitDocument};
pub use repository::HabitRepository;
pub use streak::{compute_streak, streak_stats, StreakStats};
