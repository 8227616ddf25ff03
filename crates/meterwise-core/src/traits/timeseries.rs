// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-series query trait.

use async_trait::async_trait;

use crate::error::MeterwiseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MeasurementField, Sample, TimeRange};

/// Read-only aggregate queries over device measurements.
#[async_trait]
pub trait TimeSeriesSource: PluginAdapter {
    /// Most recent sample of `field`, if the device ever reported one.
    async fn last_sample(
        &self,
        device_id: &str,
        field: MeasurementField,
    ) -> Result<Option<Sample>, MeterwiseError>;

    /// Time-weighted integral of instantaneous power over `range`, in
    /// watt-seconds. `None` when the range holds no samples.
    async fn power_integral(
        &self,
        device_id: &str,
        range: TimeRange,
    ) -> Result<Option<f64>, MeterwiseError>;

    /// Hourly mean series of `field` over `range`, oldest first.
    async fn hourly_means(
        &self,
        device_id: &str,
        field: MeasurementField,
        range: TimeRange,
    ) -> Result<Vec<Sample>, MeterwiseError>;
}
