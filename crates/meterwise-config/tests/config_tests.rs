// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Meterwise configuration system.

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use meterwise_config::diagnostic::ConfigError;
use meterwise_config::model::{MeterwiseConfig, TelegramMode};
use meterwise_config::{load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[service]
name = "meterwise-test"
log_level = "debug"
utc_offset_minutes = -300

[telegram]
bot_token = "123:ABC"
mode = "polling"

[storage]
database_path = "/tmp/meterwise.db"
wal_mode = false

[timeseries]
url = "http://influx:8086"
token = "t0k"
org = "acme"
bucket = "energy"

[classifier]
api_key = "gm-key"

[ticketing]
url = "https://desk.example.com"
account_id = 3
api_token = "cw"
inbox_id = 7

[mailer]
api_key = "re_123"
from = "Soporte <soporte@example.com>"

[escalation]
window_minutes = 30

[link]
code_ttl_minutes = 5

[tariff]
tax_multiplier = 1.0

[[tariff.schedules]]
code = "01"
brackets = [{ upto_kwh = 150.0, unit_price = 1.0 }, { unit_price = 2.0 }]

[gateway]
host = "0.0.0.0"
port = 8080
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.service.name, "meterwise-test");
    assert_eq!(config.service.utc_offset_minutes, -300);
    assert_eq!(config.telegram.mode, TelegramMode::Polling);
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert!(!config.storage.wal_mode);
    assert_eq!(config.timeseries.bucket, "energy");
    assert_eq!(config.timeseries.measurement, "energia");
    assert_eq!(config.ticketing.inbox_id, Some(7));
    assert_eq!(config.escalation.window_minutes, 30);
    assert_eq!(config.link.code_ttl_minutes, 5);
    assert_eq!(config.tariff.schedules.len(), 1);
    assert_eq!(config.tariff.schedules[0].brackets[1].upto_kwh, None);
    assert_eq!(config.gateway.port, 8080);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("defaults");
    assert_eq!(config.service.name, "meterwise");
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.service.utc_offset_minutes, -360);
    assert_eq!(config.telegram.mode, TelegramMode::Webhook);
    assert!(config.telegram.bot_token.is_none());
    assert!(config.storage.database_path.ends_with("meterwise.db"));
    assert_eq!(config.timeseries.power_field, "power");
    assert_eq!(config.timeseries.voltage_field, "vrms");
    assert_eq!(config.classifier.model, "gemini-2.5-flash");
    assert_eq!(config.escalation.window_minutes, 60);
    assert_eq!(config.link.code_ttl_minutes, 10);
    assert!((config.tariff.tax_multiplier - 1.16).abs() < 1e-10);
    assert!(config.tariff.schedules.is_empty());
    assert_eq!(config.diagnostics.night_window_start_hour, 3);
    assert_eq!(config.diagnostics.night_window_end_hour, 5);
    assert_eq!(config.diagnostics.peak_days, 7);
    assert_eq!(config.charts.base_url, "https://quickchart.io/chart");
    assert_eq!(config.gateway.host, "127.0.0.1");
}

#[test]
fn unknown_key_reports_suggestion() {
    let toml = r#"
[escalation]
window_minuts = 30
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "window_minutes")
    });
    assert!(found, "expected a window_minutes suggestion, got {errors:?}");
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[whatsapp]\ntoken = \"x\"\n").unwrap_err();
    assert!(!errors.is_empty());
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got {errors:?}"
    );
}

#[test]
fn bad_telegram_mode_is_rejected() {
    assert!(load_config_from_str("[telegram]\nmode = \"carrier-pigeon\"\n").is_err());
}

#[test]
fn validation_errors_surface_through_load() {
    let errors = load_and_validate_str("[link]\ncode_ttl_minutes = 0\n").unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("code_ttl_minutes"))
    ));
}

/// Env overrides arrive as dotted keys; simulated here without touching the process env.
#[test]
fn dotted_override_wins_over_toml() {
    let config: MeterwiseConfig = Figment::new()
        .merge(Serialized::defaults(MeterwiseConfig::default()))
        .merge(Toml::string("[telegram]\nbot_token = \"from-file\"\n"))
        .merge(("telegram.bot_token", "from-env"))
        .merge(("escalation.window_minutes", 15))
        .extract()
        .expect("override should merge");

    assert_eq!(config.telegram.bot_token.as_deref(), Some("from-env"));
    assert_eq!(config.escalation.window_minutes, 15);
}

#[test]
fn missing_config_files_are_skipped() {
    let config: MeterwiseConfig = Figment::new()
        .merge(Serialized::defaults(MeterwiseConfig::default()))
        .merge(Toml::file("/nonexistent/path/meterwise.toml"))
        .extract()
        .expect("missing file should be skipped");
    assert_eq!(config.service.name, "meterwise");
}
