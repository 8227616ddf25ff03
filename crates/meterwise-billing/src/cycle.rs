// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bimonthly billing-cycle cutoff dates.

use chrono::{Datelike, Months, NaiveDate};
use meterwise_core::{BillingParity, MeterwiseError};
use serde::Serialize;

/// How many trailing months are searched for a matching cutoff.
const LOOKBACK_MONTHS: u32 = 12;

/// The cutoff that opened the current period and the one that will close it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingCycle {
    pub last_cutoff: NaiveDate,
    pub next_cutoff: NaiveDate,
}

impl BillingCycle {
    /// Computes the cycle containing `today`, or a [`MeterwiseError::BillingCycle`]
    /// when the subscriber's settings yield no candidate.
    pub fn for_date(
        today: NaiveDate,
        cutoff_day: u32,
        parity: BillingParity,
    ) -> Result<Self, MeterwiseError> {
        cutoff_dates(today, cutoff_day, parity)
            .ok_or(MeterwiseError::BillingCycle { cutoff_day, parity })
    }

    /// Number of days between the two cutoffs.
    pub fn length_days(&self) -> i64 {
        (self.next_cutoff - self.last_cutoff).num_days()
    }
}

/// Most recent cutoff on or before `today` and the one two months after it.
///
/// Candidates are taken from the trailing twelve months (current month
/// included), clamping `cutoff_day` to the month length and keeping only
/// months of the requested parity. A cutoff falling on `today` counts as
/// already passed. Returns `None` when `cutoff_day` is outside 1..=31.
pub fn cutoff_dates(
    today: NaiveDate,
    cutoff_day: u32,
    parity: BillingParity,
) -> Option<BillingCycle> {
    if !(1..=31).contains(&cutoff_day) {
        return None;
    }

    let this_month = today.with_day(1)?;
    let last_cutoff = (0..LOOKBACK_MONTHS)
        .filter_map(|back| this_month.checked_sub_months(Months::new(back)))
        .filter(|first| parity.matches_month(first.month()))
        .filter_map(|first| clamped_day(first.year(), first.month(), cutoff_day))
        .filter(|candidate| *candidate <= today)
        .max()?;

    let following = last_cutoff.with_day(1)?.checked_add_months(Months::new(2))?;
    let next_cutoff = clamped_day(following.year(), following.month(), cutoff_day)?;

    Some(BillingCycle {
        last_cutoff,
        next_cutoff,
    })
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    match first.checked_add_months(Months::new(1)) {
        Some(next) => (next - first).num_days() as u32,
        None => 31,
    }
}

/// `date` moved by `months`, with its day clamped to the target month.
pub fn add_months_clamped(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    // chrono clamps the day itself when the target month is shorter.
    date.checked_add_months(Months::new(months))
}

fn clamped_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)))
}
