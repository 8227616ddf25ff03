// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: compiled defaults, `/etc/meterwise/meterwise.toml`,
//! `~/.config/meterwise/meterwise.toml`, `./meterwise.toml`, then
//! `METERWISE_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MeterwiseConfig;

/// Top-level sections, in the order env keys are matched against them.
const SECTIONS: &[&str] = &[
    "service",
    "telegram",
    "storage",
    "timeseries",
    "classifier",
    "ticketing",
    "mailer",
    "escalation",
    "link",
    "tariff",
    "diagnostics",
    "charts",
    "gateway",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
pub fn load_config() -> Result<MeterwiseConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<MeterwiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MeterwiseConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MeterwiseConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MeterwiseConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MeterwiseConfig::default()))
        .merge(Toml::file("/etc/meterwise/meterwise.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("meterwise/meterwise.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("meterwise.toml"))
        .merge(env_provider())
}

/// Maps `METERWISE_TELEGRAM_BOT_TOKEN` to `telegram.bot_token`.
///
/// Only the first underscore after a known section name becomes a dot;
/// `Env::split("_")` would break keys such as `bot_token`.
fn env_provider() -> Env {
    Env::prefixed("METERWISE_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
