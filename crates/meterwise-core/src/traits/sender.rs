// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound message delivery trait.

use async_trait::async_trait;

use crate::error::MeterwiseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::OutboundMessage;

/// Delivers text to a channel identity. Best-effort: callers log failures.
#[async_trait]
pub trait MessageSender: PluginAdapter {
    async fn send(&self, msg: &OutboundMessage) -> Result<(), MeterwiseError>;
}
