//! Time sources.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Source of "now" in the account's local time zone.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Offset of the account's local time from UTC.
    fn offset(&self) -> FixedOffset;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset()).date_naive()
    }
}

/// Wall clock with a fixed UTC offset.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Wall clock for `offset`.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Wall clock in UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Clock frozen at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    /// Clock frozen at `now`, reporting dates in `offset`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Clock frozen at `now` in UTC.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self::new(now, Utc.fix())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn today_follows_the_offset() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 23, 30, 0).unwrap();
        let utc = FixedClock::at(now);
        assert_eq!(utc.today(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());

        let paris = FixedClock::new(now, FixedOffset::east_opt(3600).unwrap());
        assert_eq!(paris.today(), NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    }
}
