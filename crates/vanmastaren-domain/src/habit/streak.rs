use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Summary of a habit's completion history relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub completed_days: u32,
    pub last_completion_date: Option<NaiveDate>,
}

/// Calendar day of `at` as seen from `tz`.
pub fn calendar_day<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Distinct calendar days carrying at least one completion, in ascending order.
pub fn completion_days<Tz: TimeZone>(dates: &[DateTime<Utc>], tz: &Tz) -> BTreeSet<NaiveDate> {
    dates.iter().map(|at| calendar_day(at, tz)).collect()
}

/// Number of consecutive completed days ending today, or ending yesterday when
/// today has not been completed yet.
pub fn compute_streak<Tz: TimeZone>(dates: &[DateTime<Utc>], today: NaiveDate, tz: &Tz) -> u32 {
    current_streak(&completion_days(dates, tz), today)
}

/// Full statistics over a completion history.
pub fn streak_stats<Tz: TimeZone>(
    dates: &[DateTime<Utc>],
    today: NaiveDate,
    tz: &Tz,
) -> StreakStats {
    let days = completion_days(dates, tz);

    StreakStats {
        current_streak: current_streak(&days, today),
        longest_streak: longest_streak(&days),
        completed_days: days.len() as u32,
        last_completion_date: days.iter().next_back().copied(),
    }
}

fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0u32;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }

    streak
}

fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for &day in days {
        run = match prev {
            Some(prev_day) if (day - prev_day).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    longest
}
