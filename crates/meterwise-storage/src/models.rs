// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite columns and core domain types.
//!
//! Instants are stored as RFC 3339 UTC text, calendar dates as `YYYY-MM-DD`,
//! enums by their lowercase names.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use meterwise_core::{BillingParity, ChannelIdentity, Device, Subscriber, VoltageState};
use rusqlite::Row;
use rusqlite::types::Type;

/// Column list matching [`subscriber_from_row`].
pub const SUBSCRIBER_COLUMNS: &str = "id, name, email, phone, cutoff_day, parity, service_start, \
     tariff_code, initial_reading, prior_closing_reading, channel_identity, prefers_telegram, \
     escalation_until, link_code, link_code_expires_at, leak_active, voltage_state, \
     next_payment_date";

pub const DEVICE_COLUMNS: &str = "id, subscriber_id, active";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn conversion_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn instant_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(idx, e))
    })
    .transpose()
}

fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn enum_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

/// Maps a row selected with [`SUBSCRIBER_COLUMNS`].
pub fn subscriber_from_row(row: &Row<'_>) -> rusqlite::Result<Subscriber> {
    Ok(Subscriber {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        cutoff_day: row.get(4)?,
        parity: enum_at::<BillingParity>(row, 5)?,
        service_start: date_at(row, 6)?,
        tariff_code: row.get(7)?,
        initial_reading: row.get(8)?,
        prior_closing_reading: row.get(9)?,
        channel_identity: row.get::<_, Option<String>>(10)?.map(ChannelIdentity),
        prefers_telegram: row.get(11)?,
        escalation_until: instant_at(row, 12)?,
        link_code: row.get(13)?,
        link_code_expires_at: instant_at(row, 14)?,
        leak_active: row.get(15)?,
        voltage_state: enum_at::<VoltageState>(row, 16)?,
        next_payment_date: date_at(row, 17)?,
    })
}

/// Maps a row selected with [`DEVICE_COLUMNS`].
pub fn device_from_row(row: &Row<'_>) -> rusqlite::Result<Device> {
    Ok(Device {
        id: row.get(0)?,
        subscriber_id: row.get(1)?,
        active: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn instants_are_rfc3339_utc() {
        let t = Utc.with_ymd_and_hms(2024, 4, 10, 18, 5, 0).unwrap();
        assert_eq!(format_instant(t), "2024-04-10T18:05:00Z");
    }

    #[test]
    fn dates_are_iso() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        assert_eq!(format_date(d), "2024-02-20");
    }
}
