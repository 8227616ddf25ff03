// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort outbound delivery.

use meterwise_core::{ChannelIdentity, MessageSender, OutboundMessage};
use tracing::warn;

/// Sends `text` to `recipient`. Failures are logged and swallowed; there is
/// no retry.
pub async fn deliver(sender: &dyn MessageSender, recipient: &ChannelIdentity, text: &str) {
    let message = OutboundMessage::new(recipient.clone(), text);
    if let Err(e) = sender.send(&message).await {
        warn!(recipient = %recipient, error = %e, "message delivery failed");
    }
}
