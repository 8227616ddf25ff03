// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscribers' civil calendar as a fixed UTC offset.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Timelike, Utc};
use meterwise_core::{MeterwiseError, TimeRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCalendar {
    offset: FixedOffset,
}

impl LocalCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Builds a calendar from an offset in minutes east of UTC.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, MeterwiseError> {
        FixedOffset::east_opt(minutes * 60)
            .map(Self::new)
            .ok_or_else(|| MeterwiseError::Config(format!("invalid UTC offset: {minutes} minutes")))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset)
    }

    /// Local civil date at `instant`.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.to_local(instant).date_naive()
    }

    /// Local hour of day (0-23) at `instant`.
    pub fn hour_of(&self, instant: DateTime<Utc>) -> u32 {
        self.to_local(instant).hour()
    }

    /// UTC instant of local midnight opening `date`.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let utc = local_midnight - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc, Utc)
    }

    /// `[local midnight of date, local midnight of the next day)`.
    pub fn day_range(&self, date: NaiveDate) -> TimeRange {
        let start = self.start_of_day(date);
        TimeRange::new(start, start + TimeDelta::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mexico_city() -> LocalCalendar {
        LocalCalendar::from_offset_minutes(-360).unwrap()
    }

    #[test]
    fn day_range_starts_at_local_midnight() {
        let range = mexico_city().day_range(NaiveDate::from_ymd_opt(2024, 4, 10).unwrap());
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 4, 10, 6, 0, 0).unwrap());
        assert_eq!(range.stop, Utc.with_ymd_and_hms(2024, 4, 11, 6, 0, 0).unwrap());
    }

    #[test]
    fn local_date_lags_utc_in_the_evening() {
        let cal = mexico_city();
        let late = Utc.with_ymd_and_hms(2024, 4, 11, 3, 30, 0).unwrap();
        assert_eq!(cal.date_of(late), NaiveDate::from_ymd_opt(2024, 4, 10).unwrap());
        assert_eq!(cal.hour_of(late), 21);
    }

    #[test]
    fn rejects_out_of_range_offset() {
        assert!(LocalCalendar::from_offset_minutes(24 * 60).is_err());
    }
}
