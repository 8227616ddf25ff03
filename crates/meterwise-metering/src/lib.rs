// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Energy metering for Meterwise.
//!
//! Turns raw device measurements into the figures the assistant reports:
//! period-to-date kWh with first-period carry-over, day-bounded kWh in the
//! subscriber's civil calendar, and the diagnostic heuristics (ground-fault
//! leak, base load, peak hour, voltage state). [`InfluxSource`] is the
//! production [`meterwise_core::TimeSeriesSource`].

pub mod aggregator;
pub mod calendar;
pub mod diagnostics;
pub mod influx;

pub use aggregator::{ConsumptionAggregator, PeriodConsumption, WATT_SECONDS_PER_KWH};
pub use calendar::LocalCalendar;
pub use diagnostics::{
    BaseLoad, BaseLoadLevel, Diagnostician, LeakMethod, LeakReadings, LeakVerdict, PeakHour,
    VoltageReport,
};
pub use influx::InfluxSource;
