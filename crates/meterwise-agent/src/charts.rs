// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! QuickChart links for the consumption charts.
//!
//! The chart definition travels inside the URL, so the link is built
//! locally and sent to the user as plain text.

use chrono::{Datelike, NaiveDate, Weekday};
use meterwise_config::model::ChartsConfig;
use meterwise_core::{MeterwiseError, Sample};
use meterwise_metering::LocalCalendar;
use reqwest::Url;
use serde_json::{Value, json};

const WIDTH: &str = "500";
const HEIGHT: &str = "300";

#[derive(Debug, Clone)]
pub struct ChartLinks {
    base_url: String,
}

impl ChartLinks {
    pub fn new(config: &ChartsConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
        }
    }

    /// Line chart of hourly mean watts, labelled with local `HH:MM`.
    pub fn hourly_power(
        &self,
        samples: &[Sample],
        calendar: &LocalCalendar,
    ) -> Result<Url, MeterwiseError> {
        let labels: Vec<String> = samples
            .iter()
            .map(|s| calendar.to_local(s.time).format("%H:%M").to_string())
            .collect();
        let data: Vec<f64> = samples.iter().map(|s| round_to(s.value, 2)).collect();
        self.link(json!({
            "type": "line",
            "data": {
                "labels": labels,
                "datasets": [{
                    "label": "Consumo (Watts)",
                    "data": data,
                    "fill": false,
                    "borderColor": "rgb(75, 192, 192)",
                    "tension": 0.1
                }]
            },
            "options": {
                "title": { "display": true, "text": "Consumo Promedio (Watts) de Ayer" }
            }
        }))
    }

    /// Bar chart of kWh per day, labelled like `lun 08/04`.
    pub fn daily_energy(&self, days: &[(NaiveDate, f64)]) -> Result<Url, MeterwiseError> {
        let labels: Vec<String> = days
            .iter()
            .map(|(date, _)| format!("{} {}", weekday_short(date.weekday()), date.format("%d/%m")))
            .collect();
        let data: Vec<f64> = days.iter().map(|(_, kwh)| round_to(*kwh, 3)).collect();
        self.link(json!({
            "type": "bar",
            "data": {
                "labels": labels,
                "datasets": [{
                    "label": "Consumo (kWh)",
                    "data": data,
                    "backgroundColor": "rgba(54, 162, 235, 0.6)"
                }]
            },
            "options": {
                "title": { "display": true, "text": "Consumo Diario (kWh) - Últimos 7 Días" }
            }
        }))
    }

    fn link(&self, chart: Value) -> Result<Url, MeterwiseError> {
        let chart = chart.to_string();
        Url::parse_with_params(
            &self.base_url,
            [
                ("c", chart.as_str()),
                ("width", WIDTH),
                ("height", HEIGHT),
                ("backgroundColor", "white"),
            ],
        )
        .map_err(|e| MeterwiseError::Config(format!("invalid chart base URL: {e}")))
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn weekday_short(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lun",
        Weekday::Tue => "mar",
        Weekday::Wed => "mié",
        Weekday::Thu => "jue",
        Weekday::Fri => "vie",
        Weekday::Sat => "sáb",
        Weekday::Sun => "dom",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn chart_of(url: &Url) -> Value {
        let (_, c) = url.query_pairs().find(|(k, _)| k == "c").unwrap();
        serde_json::from_str(&c).unwrap()
    }

    #[test]
    fn hourly_chart_uses_local_labels() {
        let links = ChartLinks::new(&ChartsConfig::default());
        let calendar = LocalCalendar::from_offset_minutes(-360).unwrap();
        let samples = [
            Sample::new(Utc.with_ymd_and_hms(2024, 4, 9, 6, 0, 0).unwrap(), 120.456),
            Sample::new(Utc.with_ymd_and_hms(2024, 4, 9, 7, 0, 0).unwrap(), 98.0),
        ];
        let url = links.hourly_power(&samples, &calendar).unwrap();
        assert!(url.as_str().starts_with("https://quickchart.io/chart?"));

        let chart = chart_of(&url);
        assert_eq!(chart["type"], "line");
        assert_eq!(chart["data"]["labels"], json!(["00:00", "01:00"]));
        assert_eq!(chart["data"]["datasets"][0]["data"], json!([120.46, 98.0]));
    }

    #[test]
    fn daily_chart_labels_weekdays() {
        let links = ChartLinks::new(&ChartsConfig::default());
        let days = [(NaiveDate::from_ymd_opt(2024, 4, 8).unwrap(), 5.12345)];
        let chart = chart_of(&links.daily_energy(&days).unwrap());
        assert_eq!(chart["type"], "bar");
        assert_eq!(chart["data"]["labels"], json!(["lun 08/04"]));
        assert_eq!(chart["data"]["datasets"][0]["data"], json!([5.123]));
    }

    #[test]
    fn bad_base_url_is_config_error() {
        let links = ChartLinks::new(&ChartsConfig {
            base_url: "not a url".into(),
        });
        assert!(matches!(
            links.daily_energy(&[]),
            Err(MeterwiseError::Config(_))
        ));
    }
}
