// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Period-end bill projection from period-to-date consumption.

use chrono::NaiveDate;
use serde::Serialize;

use crate::cycle::BillingCycle;
use crate::tariff::TariffTable;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillProjection {
    pub kwh_to_date: f64,
    /// Whole days since the last cutoff, never less than one.
    pub days_elapsed: i64,
    pub cycle_days: i64,
    pub daily_average_kwh: f64,
    pub projected_kwh: f64,
    pub projected_cost: f64,
}

/// Extrapolates `kwh_to_date` linearly to the full cycle and prices it.
pub fn project_bill(
    cycle: &BillingCycle,
    today: NaiveDate,
    kwh_to_date: f64,
    tariff_code: &str,
    tariffs: &TariffTable,
) -> BillProjection {
    let days_elapsed = (today - cycle.last_cutoff).num_days().max(1);
    let cycle_days = cycle.length_days();
    let daily_average_kwh = kwh_to_date / days_elapsed as f64;
    let projected_kwh = daily_average_kwh * cycle_days as f64;

    BillProjection {
        kwh_to_date,
        days_elapsed,
        cycle_days,
        daily_average_kwh,
        projected_kwh,
        projected_cost: tariffs.estimate_cost(projected_kwh, tariff_code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::cutoff_dates;
    use meterwise_core::BillingParity;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn extrapolates_daily_average_over_cycle() {
        let cycle = cutoff_dates(date(2024, 3, 15), 31, BillingParity::Odd).unwrap();
        let table = TariffTable::default();
        let p = project_bill(&cycle, date(2024, 3, 1), 60.0, "DAC", &table);

        assert_eq!(p.days_elapsed, 30);
        assert_eq!(p.cycle_days, 60);
        assert!((p.daily_average_kwh - 2.0).abs() < 1e-10);
        assert!((p.projected_kwh - 120.0).abs() < 1e-10);
        assert!((p.projected_cost - 120.0 * 7.80 * 1.16).abs() < 1e-9);
    }

    #[test]
    fn cutoff_day_counts_as_one_elapsed_day() {
        let cycle = cutoff_dates(date(2024, 4, 15), 15, BillingParity::Even).unwrap();
        let table = TariffTable::default();
        let p = project_bill(&cycle, date(2024, 4, 15), 5.0, "01", &table);
        assert_eq!(p.days_elapsed, 1);
        assert!((p.projected_kwh - 5.0 * 61.0).abs() < 1e-10);
    }
}
