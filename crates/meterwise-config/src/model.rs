// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! Every struct uses `#[serde(deny_unknown_fields)]` so a misspelled key
//! fails at startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level Meterwise configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MeterwiseConfig {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// InfluxDB connection for device measurements.
    #[serde(default)]
    pub timeseries: TimeSeriesConfig,

    /// Gemini intent classifier and FAQ responder.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Chatwoot helpdesk used while a conversation is escalated.
    #[serde(default)]
    pub ticketing: TicketingConfig,

    /// Resend account used to deliver link codes.
    #[serde(default)]
    pub mailer: MailerConfig,

    #[serde(default)]
    pub escalation: EscalationConfig,

    #[serde(default)]
    pub link: LinkConfig,

    #[serde(default)]
    pub tariff: TariffConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    #[serde(default)]
    pub charts: ChartsConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Offset of the subscribers' civil calendar from UTC, in minutes.
    /// Day boundaries and hour-of-day grouping use this offset.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

fn default_service_name() -> String {
    "meterwise".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_utc_offset_minutes() -> i32 {
    -360
}

/// How inbound Telegram updates reach the assistant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TelegramMode {
    /// Updates are POSTed to the gateway's `/webhooks/telegram` route.
    #[default]
    Webhook,
    /// The process long-polls the Bot API itself.
    Polling,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token. `None` disables outbound delivery.
    #[serde(default)]
    pub bot_token: Option<String>,

    #[serde(default)]
    pub mode: TelegramMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("meterwise").join("meterwise.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("meterwise.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimeSeriesConfig {
    #[serde(default = "default_timeseries_url")]
    pub url: String,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub org: String,

    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_measurement")]
    pub measurement: String,

    #[serde(default = "default_power_field")]
    pub power_field: String,

    #[serde(default = "default_voltage_field")]
    pub voltage_field: String,
}

impl Default for TimeSeriesConfig {
    fn default() -> Self {
        Self {
            url: default_timeseries_url(),
            token: None,
            org: String::new(),
            bucket: String::new(),
            measurement: default_measurement(),
            power_field: default_power_field(),
            voltage_field: default_voltage_field(),
        }
    }
}

fn default_timeseries_url() -> String {
    "http://localhost:8086".to_string()
}

fn default_measurement() -> String {
    "energia".to_string()
}

fn default_power_field() -> String {
    "power".to_string()
}

fn default_voltage_field() -> String {
    "vrms".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Gemini API key. `None` makes every message classify as unknown.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_classifier_model")]
    pub model: String,

    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_classifier_model(),
            endpoint: default_classifier_endpoint(),
        }
    }
}

fn default_classifier_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_classifier_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Chatwoot settings. Relay is skipped unless all four values are present.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TicketingConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub account_id: Option<u64>,

    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default)]
    pub inbox_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailerConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_mail_from")]
    pub from: String,

    #[serde(default = "default_mailer_endpoint")]
    pub endpoint: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from: default_mail_from(),
            endpoint: default_mailer_endpoint(),
        }
    }
}

fn default_mail_from() -> String {
    "Meterwise <no-reply@meterwise.app>".to_string()
}

fn default_mailer_endpoint() -> String {
    "https://api.resend.com".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationConfig {
    /// Length of the sliding human-support window.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            window_minutes: default_window_minutes(),
        }
    }
}

fn default_window_minutes() -> i64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    #[serde(default = "default_code_ttl_minutes")]
    pub code_ttl_minutes: i64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: default_code_ttl_minutes(),
        }
    }
}

fn default_code_ttl_minutes() -> i64 {
    10
}

/// Tariff table settings.
///
/// An empty `schedules` list selects the built-in residential table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TariffConfig {
    #[serde(default = "default_tax_multiplier")]
    pub tax_multiplier: f64,

    #[serde(default)]
    pub schedules: Vec<TariffScheduleConfig>,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            tax_multiplier: default_tax_multiplier(),
            schedules: Vec::new(),
        }
    }
}

fn default_tax_multiplier() -> f64 {
    1.16
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TariffScheduleConfig {
    pub code: String,
    pub brackets: Vec<TariffBracketConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TariffBracketConfig {
    /// Cumulative upper bound in kWh; omitted on the last, unbounded bracket.
    #[serde(default)]
    pub upto_kwh: Option<f64>,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_phantom_low_watts")]
    pub phantom_low_watts: f64,

    #[serde(default = "default_phantom_normal_watts")]
    pub phantom_normal_watts: f64,

    /// Leakage threshold for the breaker-off self-test, in amps.
    #[serde(default = "default_leak_breaker_test_amps")]
    pub leak_breaker_test_amps: f64,

    /// Threshold on |sum(phases) - neutral|, in amps.
    #[serde(default = "default_leak_imbalance_amps")]
    pub leak_imbalance_amps: f64,

    /// Local hour (inclusive) where the base-load window starts.
    #[serde(default = "default_night_window_start_hour")]
    pub night_window_start_hour: u32,

    /// Local hour (exclusive) where the base-load window ends.
    #[serde(default = "default_night_window_end_hour")]
    pub night_window_end_hour: u32,

    #[serde(default = "default_base_load_days")]
    pub base_load_days: u32,

    #[serde(default = "default_peak_days")]
    pub peak_days: u32,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            phantom_low_watts: default_phantom_low_watts(),
            phantom_normal_watts: default_phantom_normal_watts(),
            leak_breaker_test_amps: default_leak_breaker_test_amps(),
            leak_imbalance_amps: default_leak_imbalance_amps(),
            night_window_start_hour: default_night_window_start_hour(),
            night_window_end_hour: default_night_window_end_hour(),
            base_load_days: default_base_load_days(),
            peak_days: default_peak_days(),
        }
    }
}

fn default_phantom_low_watts() -> f64 {
    50.0
}

fn default_phantom_normal_watts() -> f64 {
    150.0
}

fn default_leak_breaker_test_amps() -> f64 {
    0.05
}

fn default_leak_imbalance_amps() -> f64 {
    0.15
}

fn default_night_window_start_hour() -> u32 {
    3
}

fn default_night_window_end_hour() -> u32 {
    5
}

fn default_base_load_days() -> u32 {
    3
}

fn default_peak_days() -> u32 {
    7
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChartsConfig {
    #[serde(default = "default_charts_base_url")]
    pub base_url: String,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            base_url: default_charts_base_url(),
        }
    }
}

fn default_charts_base_url() -> String {
    "https://quickchart.io/chart".to_string()
}

/// HTTP listener for webhooks and health checks.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}
