// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.
//!
//! All problems are collected; validation never stops at the first one.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{MeterwiseConfig, TariffScheduleConfig};

/// Validate a deserialized configuration.
pub fn validate_config(config: &MeterwiseConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let offset = config.service.utc_offset_minutes;
    if !(-720..=840).contains(&offset) {
        errors.push(ConfigError::validation(format!(
            "service.utc_offset_minutes must be within -720..=840, got {offset}"
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    }

    if config.escalation.window_minutes <= 0 {
        errors.push(ConfigError::validation(format!(
            "escalation.window_minutes must be positive, got {}",
            config.escalation.window_minutes
        )));
    }

    if config.link.code_ttl_minutes <= 0 {
        errors.push(ConfigError::validation(format!(
            "link.code_ttl_minutes must be positive, got {}",
            config.link.code_ttl_minutes
        )));
    }

    let tax = config.tariff.tax_multiplier;
    if tax.is_nan() || tax <= 0.0 {
        errors.push(ConfigError::validation(format!(
            "tariff.tax_multiplier must be positive, got {tax}"
        )));
    }

    let mut codes = HashSet::new();
    for schedule in &config.tariff.schedules {
        if !codes.insert(schedule.code.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate tariff code `{}` in [[tariff.schedules]]",
                schedule.code
            )));
        }
        validate_schedule(schedule, &mut errors);
    }

    let diag = &config.diagnostics;
    if diag.phantom_low_watts > diag.phantom_normal_watts {
        errors.push(ConfigError::validation(format!(
            "diagnostics.phantom_low_watts ({}) must not exceed phantom_normal_watts ({})",
            diag.phantom_low_watts, diag.phantom_normal_watts
        )));
    }
    if diag.night_window_start_hour >= diag.night_window_end_hour
        || diag.night_window_end_hour > 24
    {
        errors.push(ConfigError::validation(format!(
            "diagnostics night window {}..{} must satisfy start < end <= 24",
            diag.night_window_start_hour, diag.night_window_end_hour
        )));
    }
    if diag.base_load_days == 0 || diag.peak_days == 0 {
        errors.push(ConfigError::validation(
            "diagnostics.base_load_days and peak_days must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_schedule(schedule: &TariffScheduleConfig, errors: &mut Vec<ConfigError>) {
    let code = &schedule.code;
    if schedule.brackets.is_empty() {
        errors.push(ConfigError::validation(format!(
            "tariff `{code}` has no brackets"
        )));
        return;
    }

    let last = schedule.brackets.len() - 1;
    let mut previous = 0.0;
    for (i, bracket) in schedule.brackets.iter().enumerate() {
        if bracket.unit_price < 0.0 {
            errors.push(ConfigError::validation(format!(
                "tariff `{code}` bracket {i} has a negative unit_price"
            )));
        }
        match (bracket.upto_kwh, i == last) {
            (Some(_), true) => errors.push(ConfigError::validation(format!(
                "tariff `{code}`: the last bracket must omit upto_kwh"
            ))),
            (None, false) => errors.push(ConfigError::validation(format!(
                "tariff `{code}`: only the last bracket may omit upto_kwh"
            ))),
            (Some(upto), false) => {
                if upto <= previous {
                    errors.push(ConfigError::validation(format!(
                        "tariff `{code}`: bracket bounds must be ascending, {upto} follows {previous}"
                    )));
                }
                previous = upto;
            }
            (None, true) => {}
        }
    }
}
