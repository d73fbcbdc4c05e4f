use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone};
use std::fmt;

/// Time zone that places completion instants on calendar days.
///
/// A `DateTime<FixedOffset>` only remembers the offset in effect at one
/// instant, so days before a daylight saving change would be cut at the wrong
/// hour. [`CalendarZone::Local`] keeps the zone itself and survives
/// `DateTime::timezone()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarZone {
    /// The machine's zone, daylight saving rules included.
    Local,
    /// Constant offset from UTC.
    Fixed(FixedOffset),
}

/// Offset in effect at one instant, tagged with the zone it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarOffset {
    zone: CalendarZone,
    offset: FixedOffset,
}

impl CalendarZone {
    fn tag(self, offset: FixedOffset) -> CalendarOffset {
        CalendarOffset { zone: self, offset }
    }
}

impl Offset for CalendarOffset {
    fn fix(&self) -> FixedOffset {
        self.offset
    }
}

impl fmt::Display for CalendarOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.offset, f)
    }
}

impl TimeZone for CalendarZone {
    type Offset = CalendarOffset;

    fn from_offset(offset: &CalendarOffset) -> Self {
        offset.zone
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<CalendarOffset> {
        match *self {
            CalendarZone::Local => chrono::Local
                .offset_from_local_date(local)
                .map(|offset| self.tag(offset)),
            CalendarZone::Fixed(offset) => LocalResult::Single(self.tag(offset)),
        }
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<CalendarOffset> {
        match *self {
            CalendarZone::Local => chrono::Local
                .offset_from_local_datetime(local)
                .map(|offset| self.tag(offset)),
            CalendarZone::Fixed(offset) => LocalResult::Single(self.tag(offset)),
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> CalendarOffset {
        match *self {
            CalendarZone::Local => self.tag(chrono::Local.offset_from_utc_date(utc)),
            CalendarZone::Fixed(offset) => self.tag(offset),
        }
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> CalendarOffset {
        match *self {
            CalendarZone::Local => self.tag(chrono::Local.offset_from_utc_datetime(utc)),
            CalendarZone::Fixed(offset) => self.tag(offset),
        }
    }
}
