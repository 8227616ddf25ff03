// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic heuristics over device measurements.
//!
//! The classification rules are pure functions; [`Diagnostician`] wraps them
//! with the time-series queries they need.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use meterwise_config::model::DiagnosticsConfig;
use meterwise_core::{
    MeasurementField, MeterwiseError, Sample, Subscriber, TimeRange, TimeSeriesSource,
    VoltageState,
};
use serde::Serialize;
use tracing::debug;

use crate::calendar::LocalCalendar;

/// Current readings used by the ground-fault leak check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeakReadings {
    /// Per-phase leakage measured with the main breaker off, if that
    /// self-test was performed.
    pub breaker_test_leakage: Option<Vec<f64>>,
    /// Incoming current on each phase.
    pub phase_currents: Vec<f64>,
    pub neutral_current: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeakMethod {
    BreakerTest,
    PhaseImbalance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeakVerdict {
    pub method: LeakMethod,
    pub leakage_amps: f64,
    pub detected: bool,
}

/// Flags a ground-fault leak. The breaker-off self-test takes precedence
/// over the phase/neutral imbalance when it is available.
///
/// The assistant never calls this on a chat turn; it reads the subscriber's
/// `leak_active` flag, which the hourly monitoring job sets from this verdict.
pub fn detect_leak(readings: &LeakReadings, config: &DiagnosticsConfig) -> LeakVerdict {
    match &readings.breaker_test_leakage {
        Some(per_phase) => {
            let leakage_amps: f64 = per_phase.iter().sum();
            LeakVerdict {
                method: LeakMethod::BreakerTest,
                leakage_amps,
                detected: leakage_amps > config.leak_breaker_test_amps,
            }
        }
        None => {
            let incoming: f64 = readings.phase_currents.iter().sum();
            let leakage_amps = (incoming - readings.neutral_current).abs();
            LeakVerdict {
                method: LeakMethod::PhaseImbalance,
                leakage_amps,
                detected: leakage_amps > config.leak_imbalance_amps,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BaseLoadLevel {
    /// Fridge and modem territory.
    Low,
    /// Explainable by a few always-on appliances.
    Normal,
    Elevated,
}

pub fn classify_base_load(watts: f64, config: &DiagnosticsConfig) -> BaseLoadLevel {
    if watts <= config.phantom_low_watts {
        BaseLoadLevel::Low
    } else if watts <= config.phantom_normal_watts {
        BaseLoadLevel::Normal
    } else {
        BaseLoadLevel::Elevated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseLoad {
    pub watts: f64,
    pub level: BaseLoadLevel,
}

/// Mean of the samples whose local hour lies in `[start_hour, end_hour)`.
pub fn night_mean(
    samples: &[Sample],
    calendar: &LocalCalendar,
    start_hour: u32,
    end_hour: u32,
) -> Option<f64> {
    let window: Vec<f64> = samples
        .iter()
        .filter(|s| (start_hour..end_hour).contains(&calendar.hour_of(s.time)))
        .map(|s| s.value)
        .collect();
    if window.is_empty() {
        None
    } else {
        Some(window.iter().sum::<f64>() / window.len() as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakHour {
    /// Local hour of day, 0-23.
    pub hour: u32,
    pub mean_watts: f64,
}

/// Hour of day with the highest mean across days. Ties go to the lowest hour.
pub fn peak_hour(samples: &[Sample], calendar: &LocalCalendar) -> Option<PeakHour> {
    let mut sums = [0.0f64; 24];
    let mut counts = [0u32; 24];
    for sample in samples {
        let hour = calendar.hour_of(sample.time) as usize;
        sums[hour] += sample.value;
        counts[hour] += 1;
    }

    let mut best: Option<PeakHour> = None;
    for hour in 0..24 {
        if counts[hour] == 0 {
            continue;
        }
        let mean_watts = sums[hour] / f64::from(counts[hour]);
        if best.is_none_or(|b| mean_watts > b.mean_watts) {
            best = Some(PeakHour {
                hour: hour as u32,
                mean_watts,
            });
        }
    }
    best
}

/// Voltage quality as reported to the subscriber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoltageReport {
    /// Recent spikes above the upper limit.
    High,
    /// Recent sags below the lower limit.
    Low,
    /// Stable; carries the latest reading when one exists.
    Normal { latest: Option<Sample> },
}

/// Runs the heuristics against a time-series source.
#[derive(Clone)]
pub struct Diagnostician {
    source: Arc<dyn TimeSeriesSource>,
    calendar: LocalCalendar,
    config: DiagnosticsConfig,
}

impl Diagnostician {
    pub fn new(
        source: Arc<dyn TimeSeriesSource>,
        calendar: LocalCalendar,
        config: DiagnosticsConfig,
    ) -> Self {
        Self {
            source,
            calendar,
            config,
        }
    }

    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Mean power in the night window across the trailing days, classified.
    /// `None` when the window holds no data.
    pub async fn base_load(
        &self,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<BaseLoad>, MeterwiseError> {
        let range = trailing_days(now, self.config.base_load_days);
        let samples = self
            .source
            .hourly_means(device_id, MeasurementField::Power, range)
            .await?;
        let watts = night_mean(
            &samples,
            &self.calendar,
            self.config.night_window_start_hour,
            self.config.night_window_end_hour,
        );
        debug!(device_id, samples = samples.len(), ?watts, "base load computed");
        Ok(watts.map(|watts| BaseLoad {
            watts,
            level: classify_base_load(watts, &self.config),
        }))
    }

    pub async fn peak_hour(
        &self,
        device_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PeakHour>, MeterwiseError> {
        let range = trailing_days(now, self.config.peak_days);
        let samples = self
            .source
            .hourly_means(device_id, MeasurementField::Power, range)
            .await?;
        Ok(peak_hour(&samples, &self.calendar))
    }

    /// Reads the externally maintained voltage flag; only a `normal` state
    /// triggers a query for the latest reading.
    pub async fn voltage(
        &self,
        subscriber: &Subscriber,
        device_id: &str,
    ) -> Result<VoltageReport, MeterwiseError> {
        Ok(match subscriber.voltage_state {
            VoltageState::High => VoltageReport::High,
            VoltageState::Low => VoltageReport::Low,
            VoltageState::Normal => VoltageReport::Normal {
                latest: self
                    .source
                    .last_sample(device_id, MeasurementField::Voltage)
                    .await?,
            },
        })
    }
}

fn trailing_days(now: DateTime<Utc>, days: u32) -> TimeRange {
    TimeRange::new(now - TimeDelta::days(i64::from(days)), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> DiagnosticsConfig {
        DiagnosticsConfig::default()
    }

    fn calendar() -> LocalCalendar {
        LocalCalendar::from_offset_minutes(-360).unwrap()
    }

    /// A sample at the given local hour on 2024-04-0`day`.
    fn at_local_hour(day: u32, hour: u32, value: f64) -> Sample {
        let local = Utc.with_ymd_and_hms(2024, 4, day, hour, 0, 0).unwrap();
        Sample::new(local + TimeDelta::hours(6), value)
    }

    #[test]
    fn breaker_test_takes_precedence() {
        let readings = LeakReadings {
            breaker_test_leakage: Some(vec![0.02, 0.02]),
            phase_currents: vec![10.0],
            neutral_current: 5.0,
        };
        let verdict = detect_leak(&readings, &config());
        assert_eq!(verdict.method, LeakMethod::BreakerTest);
        assert!(!verdict.detected);

        let leaking = LeakReadings {
            breaker_test_leakage: Some(vec![0.03, 0.03]),
            ..readings
        };
        assert!(detect_leak(&leaking, &config()).detected);
    }

    #[test]
    fn imbalance_threshold() {
        let balanced = LeakReadings {
            breaker_test_leakage: None,
            phase_currents: vec![4.0, 3.0],
            neutral_current: 6.9,
        };
        let verdict = detect_leak(&balanced, &config());
        assert_eq!(verdict.method, LeakMethod::PhaseImbalance);
        assert!(!verdict.detected);

        let leaking = LeakReadings {
            neutral_current: 6.8,
            ..balanced
        };
        assert!(detect_leak(&leaking, &config()).detected);
    }

    #[test]
    fn base_load_boundaries_are_inclusive() {
        let c = config();
        assert_eq!(classify_base_load(50.0, &c), BaseLoadLevel::Low);
        assert_eq!(classify_base_load(50.1, &c), BaseLoadLevel::Normal);
        assert_eq!(classify_base_load(150.0, &c), BaseLoadLevel::Normal);
        assert_eq!(classify_base_load(150.1, &c), BaseLoadLevel::Elevated);
    }

    #[test]
    fn night_mean_uses_local_hours() {
        let samples = vec![
            at_local_hour(1, 2, 500.0),
            at_local_hour(1, 3, 40.0),
            at_local_hour(1, 4, 60.0),
            at_local_hour(1, 5, 500.0),
            at_local_hour(2, 3, 80.0),
        ];
        let mean = night_mean(&samples, &calendar(), 3, 5).unwrap();
        assert!((mean - 60.0).abs() < 1e-10);
        assert_eq!(night_mean(&samples[..1], &calendar(), 3, 5), None);
    }

    #[test]
    fn peak_hour_averages_across_days() {
        let samples = vec![
            at_local_hour(1, 19, 900.0),
            at_local_hour(2, 19, 100.0),
            at_local_hour(1, 14, 600.0),
            at_local_hour(2, 14, 600.0),
        ];
        let peak = peak_hour(&samples, &calendar()).unwrap();
        assert_eq!(peak.hour, 14);
        assert!((peak.mean_watts - 600.0).abs() < 1e-10);
    }

    #[test]
    fn peak_hour_tie_goes_to_lowest_hour() {
        let samples = vec![at_local_hour(1, 21, 300.0), at_local_hour(1, 8, 300.0)];
        assert_eq!(peak_hour(&samples, &calendar()).unwrap().hour, 8);
    }

    #[test]
    fn peak_hour_of_nothing() {
        assert!(peak_hour(&[], &calendar()).is_none());
    }
}
