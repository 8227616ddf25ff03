// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `meterwise cycle` and `meterwise estimate`.

use chrono::NaiveDate;
use meterwise_billing::{BillingCycle, TariffTable};
use meterwise_config::MeterwiseConfig;
use meterwise_core::{BillingParity, Clock, MeterwiseError, SystemClock};
use meterwise_metering::LocalCalendar;

pub fn cycle(
    config: &MeterwiseConfig,
    cutoff_day: u32,
    parity: BillingParity,
    today: Option<NaiveDate>,
) -> Result<String, MeterwiseError> {
    let today = match today {
        Some(date) => date,
        None => LocalCalendar::from_offset_minutes(config.service.utc_offset_minutes)?
            .date_of(SystemClock.now()),
    };
    let cycle = BillingCycle::for_date(today, cutoff_day, parity)?;
    Ok(format!(
        "today:       {today}\nlast cutoff: {}\nnext cutoff: {}\nlength:      {} days\n",
        cycle.last_cutoff,
        cycle.next_cutoff,
        cycle.length_days()
    ))
}

pub fn estimate(config: &MeterwiseConfig, kwh: f64, tariff: &str) -> String {
    let table = TariffTable::from_config(&config.tariff);
    if table.brackets(tariff).is_none() {
        return format!("unknown tariff code '{tariff}'\n");
    }
    format!(
        "{kwh:.2} kWh under tariff {tariff}: ${:.2} MXN (tax x{})\n",
        table.estimate_cost(kwh, tariff),
        table.tax_multiplier()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_for_explicit_date() {
        let out = cycle(
            &MeterwiseConfig::default(),
            15,
            BillingParity::Even,
            NaiveDate::from_ymd_opt(2024, 4, 10),
        )
        .unwrap();
        assert!(out.contains("last cutoff: 2024-02-15"));
        assert!(out.contains("next cutoff: 2024-04-15"));
        assert!(out.contains("length:      60 days"));
    }

    #[test]
    fn invalid_cutoff_day_is_an_error() {
        let err = cycle(
            &MeterwiseConfig::default(),
            0,
            BillingParity::Odd,
            NaiveDate::from_ymd_opt(2024, 4, 10),
        )
        .unwrap_err();
        assert!(matches!(err, MeterwiseError::BillingCycle { .. }));
    }

    #[test]
    fn unknown_tariff_is_reported() {
        assert!(estimate(&MeterwiseConfig::default(), 100.0, "ZZ").contains("unknown tariff"));
    }

    #[test]
    fn zero_consumption_costs_nothing() {
        let out = estimate(&MeterwiseConfig::default(), 0.0, "01");
        assert!(out.contains("$0.00"), "{out}");
    }
}
