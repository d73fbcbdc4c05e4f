use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Mutex;
use vanmastaren_domain::habit::CalendarZone;

/// Source of the current time. The zone of the returned value decides which
/// calendar day every completion falls on.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<CalendarZone>;
}

/// Wall clock in the machine's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<CalendarZone> {
        Utc::now().with_timezone(&CalendarZone::Local)
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<CalendarZone>>,
}

impl FixedClock {
    /// Pinned to the offset of `now`.
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self::in_zone(now, CalendarZone::Fixed(*now.offset()))
    }

    pub fn in_zone(now: DateTime<FixedOffset>, zone: CalendarZone) -> Self {
        Self {
            now: Mutex::new(now.with_timezone(&zone)),
        }
    }

    /// Move to `now`, keeping the zone.
    pub fn set(&self, now: DateTime<FixedOffset>) {
        let mut current = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *current = now.with_timezone(&current.timezone());
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<CalendarZone> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
