// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for Meterwise.
//!
//! [`TelegramSender`] delivers replies through the Bot API via teloxide.
//! Inbound text arrives either through the gateway webhook, parsed with
//! [`handler::parse_update`], or through [`poller::run_polling`].

pub mod handler;
pub mod poller;

use async_trait::async_trait;
use meterwise_config::model::TelegramConfig;
use meterwise_core::{
    AdapterType, ChannelIdentity, HealthStatus, MessageSender, MeterwiseError, OutboundMessage,
    PluginAdapter,
};
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tracing::debug;

/// Telegram's per-message text limit, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Outbound Telegram delivery.
///
/// Without a bot token every send fails with a channel error, which the
/// assistant logs and drops.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Option<Bot>,
}

impl TelegramSender {
    pub fn new(config: &TelegramConfig) -> Result<Self, MeterwiseError> {
        let bot = match config.bot_token.as_deref() {
            Some("") => {
                return Err(MeterwiseError::Config(
                    "telegram.bot_token cannot be empty".into(),
                ));
            }
            Some(token) => Some(Bot::new(token)),
            None => None,
        };
        Ok(Self { bot })
    }

    /// The underlying teloxide bot, when a token is configured.
    pub fn bot(&self) -> Option<&Bot> {
        self.bot.as_ref()
    }
}

/// Parses a channel identity back into a Telegram chat id.
pub fn chat_id(identity: &ChannelIdentity) -> Result<ChatId, MeterwiseError> {
    identity
        .as_str()
        .trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| MeterwiseError::Channel {
            message: format!("'{identity}' is not a Telegram chat id"),
            source: Some(Box::new(e)),
        })
}

/// Splits `text` into chunks Telegram accepts, preferring line breaks.
pub fn split_message(text: &str) -> Vec<String> {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return vec![text.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for line in text.split_inclusive('\n') {
        for ch in line.chars() {
            if current_len == MAX_MESSAGE_CHARS {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += 1;
        }
        // Prefer line ends once a chunk is half full.
        if current_len > MAX_MESSAGE_CHARS / 2 {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[async_trait]
impl PluginAdapter for TelegramSender {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, MeterwiseError> {
        let Some(bot) = &self.bot else {
            return Ok(HealthStatus::Degraded("no Telegram bot token".into()));
        };
        match bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), MeterwiseError> {
        debug!("Telegram sender shutting down");
        Ok(())
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send(&self, msg: &OutboundMessage) -> Result<(), MeterwiseError> {
        let Some(bot) = &self.bot else {
            return Err(MeterwiseError::Channel {
                message: "no Telegram bot token configured".into(),
                source: None,
            });
        };
        let chat = chat_id(&msg.recipient)?;
        for chunk in split_message(&msg.text) {
            bot.send_message(chat, chunk)
                .await
                .map_err(|e| MeterwiseError::Channel {
                    message: format!("Telegram send to {} failed: {e}", msg.recipient),
                    source: Some(Box::new(e)),
                })?;
        }
        Ok(())
    }
}
