// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! InfluxDB v2 Flux client implementing [`TimeSeriesSource`].
//!
//! Queries go to `POST /api/v2/query` and come back as CSV with a header
//! row per table. Only the `_time` and `_value` columns are read.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use meterwise_config::model::TimeSeriesConfig;
use meterwise_core::{
    AdapterType, HealthStatus, MeasurementField, MeterwiseError, PluginAdapter, Sample, TimeRange,
    TimeSeriesSource,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::json;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Flux-over-HTTP time-series source.
#[derive(Debug, Clone)]
pub struct InfluxSource {
    client: reqwest::Client,
    base_url: String,
    org: String,
    bucket: String,
    measurement: String,
    power_field: String,
    voltage_field: String,
    has_token: bool,
}

impl InfluxSource {
    pub fn new(config: &TimeSeriesConfig) -> Result<Self, MeterwiseError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/csv"));
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Token {token}")).map_err(|e| {
                MeterwiseError::Config(format!("invalid timeseries token header value: {e}"))
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MeterwiseError::TimeSeries {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
            measurement: config.measurement.clone(),
            power_field: config.power_field.clone(),
            voltage_field: config.voltage_field.clone(),
            has_token: config.token.is_some(),
        })
    }

    fn field_name(&self, field: MeasurementField) -> &str {
        match field {
            MeasurementField::Power => &self.power_field,
            MeasurementField::Voltage => &self.voltage_field,
        }
    }

    /// `from |> range |> filter` prefix shared by every query.
    fn select(&self, device_id: &str, field: MeasurementField, range: &str) -> String {
        format!(
            "from(bucket: \"{bucket}\")\n  |> range({range})\n  |> filter(fn: (r) => r._measurement == \"{measurement}\" and r._field == \"{field}\" and r.device_id == \"{device}\")",
            bucket = escape(&self.bucket),
            measurement = escape(&self.measurement),
            field = escape(self.field_name(field)),
            device = escape(device_id),
        )
    }

    async fn query(&self, flux: String) -> Result<Vec<FluxRow>, MeterwiseError> {
        let compact = flux.split_whitespace().collect::<Vec<_>>().join(" ");
        debug!(query = %compact, "running flux query");
        let url = reqwest::Url::parse_with_params(
            &format!("{}/api/v2/query", self.base_url),
            &[("org", self.org.as_str())],
        )
        .map_err(|e| MeterwiseError::TimeSeries {
            message: format!("invalid timeseries url: {e}"),
            source: Some(Box::new(e)),
        })?;
        let response = self
            .client
            .post(url)
            .json(&json!({
                "query": flux,
                "type": "flux",
                "dialect": { "header": true, "annotations": [] },
            }))
            .send()
            .await
            .map_err(|e| MeterwiseError::TimeSeries {
                message: format!("query request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| MeterwiseError::TimeSeries {
            message: format!("failed to read query response: {e}"),
            source: Some(Box::new(e)),
        })?;
        if !status.is_success() {
            return Err(MeterwiseError::time_series(format!(
                "query returned {status}: {body}"
            )));
        }
        parse_csv(&body)
    }
}

/// Escapes a value for use inside a Flux string literal.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn flux_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn bounded(range: &TimeRange) -> String {
    format!(
        "start: {}, stop: {}",
        flux_time(range.start),
        flux_time(range.stop)
    )
}

#[derive(Debug, Clone, PartialEq)]
struct FluxRow {
    time: Option<DateTime<Utc>>,
    value: f64,
}

/// Parses Influx CSV. Each table starts with its own header row; rows with
/// an empty `_value` are skipped.
fn parse_csv(body: &str) -> Result<Vec<FluxRow>, MeterwiseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    let mut columns: Option<(Option<usize>, usize)> = None;
    for record in reader.records() {
        let record = record.map_err(|e| MeterwiseError::TimeSeries {
            message: format!("malformed CSV response: {e}"),
            source: Some(Box::new(e)),
        })?;
        if record.len() <= 1 {
            continue;
        }
        if let Some(value_idx) = record.iter().position(|c| c == "_value") {
            let time_idx = record.iter().position(|c| c == "_time");
            columns = Some((time_idx, value_idx));
            continue;
        }
        let Some((time_idx, value_idx)) = columns else {
            continue;
        };
        let raw_value = record.get(value_idx).unwrap_or_default();
        if raw_value.is_empty() {
            continue;
        }
        let value = raw_value.parse::<f64>().map_err(|e| MeterwiseError::TimeSeries {
            message: format!("non-numeric _value `{raw_value}`"),
            source: Some(Box::new(e)),
        })?;
        let time = match time_idx.and_then(|i| record.get(i)).filter(|t| !t.is_empty()) {
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| MeterwiseError::TimeSeries {
                        message: format!("invalid _time `{raw}`"),
                        source: Some(Box::new(e)),
                    })?
                    .with_timezone(&Utc),
            ),
            None => None,
        };
        rows.push(FluxRow { time, value });
    }
    Ok(rows)
}

fn into_samples(rows: Vec<FluxRow>) -> Vec<Sample> {
    let mut samples: Vec<Sample> = rows
        .into_iter()
        .filter_map(|row| row.time.map(|t| Sample::new(t, row.value)))
        .collect();
    samples.sort_by_key(|s| s.time);
    samples
}

#[async_trait]
impl PluginAdapter for InfluxSource {
    fn name(&self) -> &str {
        "influxdb"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TimeSeries
    }

    async fn health_check(&self) -> Result<HealthStatus, MeterwiseError> {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() && self.has_token => Ok(HealthStatus::Healthy),
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Degraded(
                "no timeseries token configured".into(),
            )),
            Ok(resp) => Ok(HealthStatus::Unhealthy(format!(
                "health endpoint returned {}",
                resp.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), MeterwiseError> {
        Ok(())
    }
}

#[async_trait]
impl TimeSeriesSource for InfluxSource {
    async fn last_sample(
        &self,
        device_id: &str,
        field: MeasurementField,
    ) -> Result<Option<Sample>, MeterwiseError> {
        let flux = format!("{}\n  |> last()", self.select(device_id, field, "start: 0"));
        Ok(into_samples(self.query(flux).await?).pop())
    }

    async fn power_integral(
        &self,
        device_id: &str,
        range: TimeRange,
    ) -> Result<Option<f64>, MeterwiseError> {
        let flux = format!(
            "{}\n  |> integral(unit: 1s)\n  |> group()\n  |> sum()",
            self.select(device_id, MeasurementField::Power, &bounded(&range))
        );
        let rows = self.query(flux).await?;
        if rows.len() > 1 {
            warn!(device_id, tables = rows.len(), "integral returned several rows, summing");
        }
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.iter().map(|r| r.value).sum())
        })
    }

    async fn hourly_means(
        &self,
        device_id: &str,
        field: MeasurementField,
        range: TimeRange,
    ) -> Result<Vec<Sample>, MeterwiseError> {
        let flux = format!(
            "{}\n  |> aggregateWindow(every: 1h, fn: mean, createEmpty: false, timeSrc: \"_start\")",
            self.select(device_id, field, &bounded(&range))
        );
        Ok(into_samples(self.query(flux).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_tables() {
        let body = ",result,table,_start,_stop,_time,_value,_field\r\n\
,_result,0,2024-04-10T00:00:00Z,2024-04-11T00:00:00Z,2024-04-10T01:00:00Z,120.5,power\r\n\
,_result,0,2024-04-10T00:00:00Z,2024-04-11T00:00:00Z,2024-04-10T02:00:00Z,,power\r\n\
\r\n\
,result,table,_start,_stop,_time,_value,_field\r\n\
,_result,1,2024-04-10T00:00:00Z,2024-04-11T00:00:00Z,2024-04-10T03:00:00Z,80,power\r\n";
        let rows = parse_csv(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert!((rows[0].value - 120.5).abs() < 1e-10);
        assert_eq!(
            rows[1].time,
            Some(DateTime::parse_from_rfc3339("2024-04-10T03:00:00Z").unwrap().with_timezone(&Utc))
        );
    }

    #[test]
    fn rows_without_time_column() {
        let body = ",result,table,_start,_stop,_value\r\n,_result,0,a,b,7200000\r\n";
        let rows = parse_csv(body).unwrap();
        assert_eq!(rows, vec![FluxRow { time: None, value: 7_200_000.0 }]);
    }

    #[test]
    fn empty_body_has_no_rows() {
        assert!(parse_csv("").unwrap().is_empty());
        assert!(parse_csv("\r\n").unwrap().is_empty());
    }

    #[test]
    fn non_numeric_value_is_an_error() {
        let body = ",result,table,_value\r\n,_result,0,abc\r\n";
        assert!(parse_csv(body).is_err());
    }

    #[test]
    fn escapes_flux_strings() {
        assert_eq!(escape(r#"dev"1\"#), r#"dev\"1\\"#);
    }
}
