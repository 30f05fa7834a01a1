use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, Local, TimeZone};
use parking_lot::Mutex;

/// Source of local wall-clock time.
///
/// Instants carry the local UTC offset they were observed with, so every
/// derived stamp reflects the local calendar rather than UTC.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let now = Local::now();
        now.with_timezone(now.offset())
    }
}

/// Clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn parse(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(Self::new)
    }

    pub fn set(&self, instant: DateTime<FixedOffset>) {
        *self.instant.lock() = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut locked = self.instant.lock();
        *locked = *locked + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.instant.lock()
    }
}

/// `YYYYMMDD` in the instant's own offset.
pub fn day_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format("%Y%m%d").to_string()
}

/// `YYYY-MM-DD HH:MM:SS` in the instant's own offset.
pub fn local_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).expect("valid rfc3339")
    }

    #[test]
    fn day_stamp_follows_local_calendar_not_utc() {
        // 00:30 in UTC+8 is still the previous day in UTC.
        let just_after_midnight = at("2026-02-12T00:30:00+08:00");
        assert_eq!(day_stamp(&just_after_midnight), "20260212");
        assert_eq!(day_stamp(&just_after_midnight.with_timezone(&chrono::Utc)), "20260211");

        let late_evening = at("2026-02-11T23:59:59+08:00");
        assert_eq!(day_stamp(&late_evening), "20260211");
    }

    #[test]
    fn local_timestamp_is_zero_padded() {
        let instant = at("2026-03-04T05:06:07+08:00");
        assert_eq!(local_timestamp(&instant), "2026-03-04 05:06:07");
    }

    #[test]
    fn fixed_clock_can_be_moved() {
        let clock = FixedClock::parse("2026-02-11T21:30:00+08:00").expect("clock");
        assert_eq!(day_stamp(&clock.now()), "20260211");

        clock.advance(Duration::hours(3));
        assert_eq!(local_timestamp(&clock.now()), "2026-02-12 00:30:00");

        clock.set(at("2025-12-31T08:00:00-05:00"));
        assert_eq!(day_stamp(&clock.now()), "20251231");
    }

    #[test]
    fn system_clock_keeps_local_offset() {
        let now = SystemClock.now();
        let local = Local::now();
        assert_eq!(now.offset().local_minus_utc(), local.offset().local_minus_utc());
    }
}
