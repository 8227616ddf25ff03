// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `meterwise check`: reports which collaborators the configuration enables.

use meterwise_config::MeterwiseConfig;
use meterwise_config::model::TelegramMode;

fn line(name: &str, ok: bool, detail: &str) -> String {
    let mark = if ok { "ok  " } else { "off " };
    format!("  [{mark}] {name:<11} {detail}\n")
}

pub fn report(config: &MeterwiseConfig) -> String {
    let mut out = format!(
        "configuration valid for '{}' (UTC offset {} min)\n",
        config.service.name, config.service.utc_offset_minutes
    );

    let mode = match config.telegram.mode {
        TelegramMode::Webhook => "webhook",
        TelegramMode::Polling => "polling",
    };
    out.push_str(&line(
        "telegram",
        config.telegram.bot_token.is_some(),
        &format!("mode {mode}"),
    ));
    out.push_str(&line("storage", true, &config.storage.database_path));
    out.push_str(&line(
        "timeseries",
        config.timeseries.token.is_some(),
        &config.timeseries.url,
    ));
    out.push_str(&line(
        "classifier",
        config.classifier.api_key.is_some(),
        &config.classifier.model,
    ));
    let t = &config.ticketing;
    out.push_str(&line(
        "ticketing",
        t.url.is_some() && t.account_id.is_some() && t.api_token.is_some() && t.inbox_id.is_some(),
        t.url.as_deref().unwrap_or("not configured"),
    ));
    out.push_str(&line(
        "mailer",
        config.mailer.api_key.is_some(),
        &config.mailer.from,
    ));
    out.push_str(&format!(
        "  gateway on {}:{}\n",
        config.gateway.host, config.gateway.port
    ));
    out
}
