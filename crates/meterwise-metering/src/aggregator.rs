// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Period-to-date and day-bounded energy consumption.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::try_join_all;
use meterwise_billing::BillingCycle;
use meterwise_core::{MeterwiseError, Subscriber, TimeRange, TimeSeriesSource};
use serde::Serialize;
use tracing::{debug, warn};

use crate::calendar::LocalCalendar;

/// Watt-seconds in one kilowatt-hour.
pub const WATT_SECONDS_PER_KWH: f64 = 3_600_000.0;

/// Consumption since the start of the current billing period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodConsumption {
    pub cycle: BillingCycle,
    /// Later of the last cutoff and the service start date.
    pub period_start: NaiveDate,
    /// Meter-reading difference attributed to the days before installation.
    /// Negative values are passed through unchanged.
    pub carry_over_kwh: f64,
    pub measured_kwh: f64,
    pub kwh: f64,
}

/// Combines billing-cycle dates with time-series integrals.
#[derive(Clone)]
pub struct ConsumptionAggregator {
    source: Arc<dyn TimeSeriesSource>,
    calendar: LocalCalendar,
}

impl ConsumptionAggregator {
    pub fn new(source: Arc<dyn TimeSeriesSource>, calendar: LocalCalendar) -> Self {
        Self { source, calendar }
    }

    pub fn calendar(&self) -> &LocalCalendar {
        &self.calendar
    }

    /// Period-to-date kWh for `subscriber` as of `as_of`.
    ///
    /// Fails with [`MeterwiseError::BillingCycle`] when no cutoff can be
    /// derived and propagates time-series errors; no partial value is
    /// returned in either case.
    pub async fn period_consumption(
        &self,
        subscriber: &Subscriber,
        device_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<PeriodConsumption, MeterwiseError> {
        let today = self.calendar.date_of(as_of);
        let cycle = BillingCycle::for_date(today, subscriber.cutoff_day, subscriber.parity)?;

        let first_period = subscriber
            .service_start
            .is_some_and(|start| start > cycle.last_cutoff);
        let period_start = match subscriber.service_start {
            Some(start) if first_period => start,
            _ => cycle.last_cutoff,
        };

        let carry_over_kwh = match subscriber.carry_over_readings() {
            Some((initial, prior_closing)) if first_period => {
                let carry = initial - prior_closing;
                if carry < 0.0 {
                    warn!(
                        subscriber_id = %subscriber.id,
                        initial_reading = initial,
                        prior_closing_reading = prior_closing,
                        carry_over_kwh = carry,
                        "negative carry-over, meter readings look inconsistent"
                    );
                }
                carry
            }
            _ => 0.0,
        };

        let start = self.calendar.start_of_day(period_start);
        let measured_kwh = if start < as_of {
            self.source
                .power_integral(device_id, TimeRange::new(start, as_of))
                .await?
                .map_or(0.0, |ws| ws / WATT_SECONDS_PER_KWH)
        } else {
            0.0
        };

        debug!(
            subscriber_id = %subscriber.id,
            device_id,
            %period_start,
            carry_over_kwh,
            measured_kwh,
            "period consumption computed"
        );

        Ok(PeriodConsumption {
            cycle,
            period_start,
            carry_over_kwh,
            measured_kwh,
            kwh: carry_over_kwh + measured_kwh,
        })
    }

    /// kWh consumed on the local civil `date`; `None` when no samples exist.
    pub async fn consumption_on(
        &self,
        device_id: &str,
        date: NaiveDate,
    ) -> Result<Option<f64>, MeterwiseError> {
        let integral = self
            .source
            .power_integral(device_id, self.calendar.day_range(date))
            .await?;
        Ok(integral.map(|ws| ws / WATT_SECONDS_PER_KWH))
    }

    /// kWh per day for each date, queried concurrently. Days without samples
    /// are omitted.
    pub async fn daily_consumption(
        &self,
        device_id: &str,
        dates: &[NaiveDate],
    ) -> Result<Vec<(NaiveDate, f64)>, MeterwiseError> {
        let per_day = try_join_all(dates.iter().map(|&date| async move {
            self.consumption_on(device_id, date)
                .await
                .map(|kwh| kwh.map(|kwh| (date, kwh)))
        }))
        .await?;
        Ok(per_day.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use meterwise_core::{
        AdapterType, BillingParity, HealthStatus, MeasurementField, PluginAdapter, Sample,
        VoltageState,
    };
    use std::sync::Mutex;

    /// Returns a fixed integral and records every queried range.
    struct FixedIntegral {
        watt_seconds: Option<f64>,
        fail: bool,
        ranges: Mutex<Vec<TimeRange>>,
    }

    impl FixedIntegral {
        fn new(watt_seconds: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                watt_seconds,
                fail: false,
                ranges: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                watt_seconds: None,
                fail: true,
                ranges: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PluginAdapter for FixedIntegral {
        fn name(&self) -> &str {
            "fixed"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::TimeSeries
        }
        async fn health_check(&self) -> Result<HealthStatus, MeterwiseError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), MeterwiseError> {
            Ok(())
        }
    }

    #[async_trait]
    impl TimeSeriesSource for FixedIntegral {
        async fn last_sample(
            &self,
            _device_id: &str,
            _field: MeasurementField,
        ) -> Result<Option<Sample>, MeterwiseError> {
            Ok(None)
        }

        async fn power_integral(
            &self,
            _device_id: &str,
            range: TimeRange,
        ) -> Result<Option<f64>, MeterwiseError> {
            self.ranges.lock().unwrap().push(range);
            if self.fail {
                return Err(MeterwiseError::time_series("influx unreachable"));
            }
            Ok(self.watt_seconds)
        }

        async fn hourly_means(
            &self,
            _device_id: &str,
            _field: MeasurementField,
            _range: TimeRange,
        ) -> Result<Vec<Sample>, MeterwiseError> {
            Ok(Vec::new())
        }
    }

    fn subscriber() -> Subscriber {
        Subscriber {
            id: "sub-1".into(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            phone: None,
            cutoff_day: 15,
            parity: BillingParity::Even,
            service_start: None,
            tariff_code: "01".into(),
            initial_reading: None,
            prior_closing_reading: None,
            channel_identity: None,
            prefers_telegram: false,
            escalation_until: None,
            link_code: None,
            link_code_expires_at: None,
            leak_active: false,
            voltage_state: VoltageState::Normal,
            next_payment_date: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> LocalCalendar {
        LocalCalendar::from_offset_minutes(-360).unwrap()
    }

    /// Noon local time on 2024-04-10.
    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 18, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn first_period_adds_carry_over_and_starts_at_service_start() {
        let source = FixedIntegral::new(Some(50.0 * WATT_SECONDS_PER_KWH));
        let aggregator = ConsumptionAggregator::new(source.clone(), calendar());
        let mut sub = subscriber();
        sub.service_start = Some(date(2024, 2, 20));
        sub.initial_reading = Some(100.0);
        sub.prior_closing_reading = Some(80.0);

        let result = aggregator
            .period_consumption(&sub, "dev-1", as_of())
            .await
            .unwrap();

        assert_eq!(result.cycle.last_cutoff, date(2024, 2, 15));
        assert_eq!(result.period_start, date(2024, 2, 20));
        assert!((result.carry_over_kwh - 20.0).abs() < 1e-10);
        assert!((result.kwh - 70.0).abs() < 1e-10);

        let ranges = source.ranges.lock().unwrap();
        assert_eq!(ranges[0].start, calendar().start_of_day(date(2024, 2, 20)));
        assert_eq!(ranges[0].stop, as_of());
    }

    #[tokio::test]
    async fn later_periods_ignore_carry_over() {
        let source = FixedIntegral::new(Some(10.0 * WATT_SECONDS_PER_KWH));
        let aggregator = ConsumptionAggregator::new(source, calendar());
        let mut sub = subscriber();
        sub.service_start = Some(date(2023, 6, 1));
        sub.initial_reading = Some(100.0);
        sub.prior_closing_reading = Some(80.0);

        let result = aggregator
            .period_consumption(&sub, "dev-1", as_of())
            .await
            .unwrap();
        assert_eq!(result.period_start, date(2024, 2, 15));
        assert!(result.carry_over_kwh.abs() < 1e-10);
        assert!((result.kwh - 10.0).abs() < 1e-10);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn negative_carry_over_passes_through() {
        let source = FixedIntegral::new(None);
        let aggregator = ConsumptionAggregator::new(source, calendar());
        let mut sub = subscriber();
        sub.service_start = Some(date(2024, 3, 1));
        sub.initial_reading = Some(80.0);
        sub.prior_closing_reading = Some(95.5);

        let result = aggregator
            .period_consumption(&sub, "dev-1", as_of())
            .await
            .unwrap();
        assert!((result.carry_over_kwh + 15.5).abs() < 1e-10);
        assert!((result.kwh + 15.5).abs() < 1e-10);
        assert!(logs_contain("negative carry-over"));
    }

    #[tokio::test]
    async fn missing_reading_means_no_carry_over() {
        let source = FixedIntegral::new(None);
        let aggregator = ConsumptionAggregator::new(source, calendar());
        let mut sub = subscriber();
        sub.service_start = Some(date(2024, 3, 1));
        sub.initial_reading = Some(100.0);

        let result = aggregator
            .period_consumption(&sub, "dev-1", as_of())
            .await
            .unwrap();
        assert!(result.kwh.abs() < 1e-10);
    }

    #[tokio::test]
    async fn query_failure_is_an_error_not_zero() {
        let aggregator = ConsumptionAggregator::new(FixedIntegral::failing(), calendar());
        let err = aggregator
            .period_consumption(&subscriber(), "dev-1", as_of())
            .await
            .unwrap_err();
        assert!(matches!(err, MeterwiseError::TimeSeries { .. }));
    }

    #[tokio::test]
    async fn invalid_cutoff_day_is_a_cycle_error() {
        let aggregator = ConsumptionAggregator::new(FixedIntegral::new(None), calendar());
        let mut sub = subscriber();
        sub.cutoff_day = 0;
        let err = aggregator
            .period_consumption(&sub, "dev-1", as_of())
            .await
            .unwrap_err();
        assert!(matches!(err, MeterwiseError::BillingCycle { .. }));
    }

    #[tokio::test]
    async fn future_service_start_skips_query() {
        let source = FixedIntegral::failing();
        let aggregator = ConsumptionAggregator::new(source.clone(), calendar());
        let mut sub = subscriber();
        sub.service_start = Some(date(2024, 4, 12));

        let result = aggregator
            .period_consumption(&sub, "dev-1", as_of())
            .await
            .unwrap();
        assert!(result.measured_kwh.abs() < 1e-10);
        assert!(source.ranges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn day_bounded_consumption_uses_local_day() {
        let source = FixedIntegral::new(Some(7_200_000.0));
        let aggregator = ConsumptionAggregator::new(source.clone(), calendar());
        let kwh = aggregator
            .consumption_on("dev-1", date(2024, 4, 9))
            .await
            .unwrap();
        assert_eq!(kwh, Some(2.0));
        let ranges = source.ranges.lock().unwrap();
        assert_eq!(ranges[0], calendar().day_range(date(2024, 4, 9)));
    }

    #[tokio::test]
    async fn daily_consumption_keeps_input_order() {
        let source = FixedIntegral::new(Some(3_600_000.0));
        let aggregator = ConsumptionAggregator::new(source.clone(), calendar());
        let days = [date(2024, 4, 7), date(2024, 4, 8), date(2024, 4, 9)];
        let series = aggregator.daily_consumption("dev-1", &days).await.unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].0, date(2024, 4, 7));
        assert_eq!(series[2].0, date(2024, 4, 9));
        assert_eq!(source.ranges.lock().unwrap().len(), 3);
    }
}
