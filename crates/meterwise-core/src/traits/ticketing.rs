// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpdesk relay trait.

use async_trait::async_trait;

use crate::error::MeterwiseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Subscriber;

/// Appends subscriber messages to a human-handled conversation.
#[async_trait]
pub trait TicketingAdapter: PluginAdapter {
    /// Creates or appends to the open conversation for `subscriber`.
    async fn relay(&self, subscriber: &Subscriber, text: &str) -> Result<(), MeterwiseError>;
}
