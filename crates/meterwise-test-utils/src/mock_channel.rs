// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock message sender for deterministic testing.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use meterwise_core::{
    AdapterType, ChannelIdentity, HealthStatus, MessageSender, MeterwiseError, OutboundMessage,
    PluginAdapter,
};

/// Captures every message passed to `send()`. Can be switched to fail.
#[derive(Default)]
pub struct MockSender {
    sent: Mutex<Vec<OutboundMessage>>,
    failing: AtomicBool,
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail (messages are still captured).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Texts sent to `recipient`, oldest first.
    pub async fn texts_to(&self, recipient: &ChannelIdentity) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| &m.recipient == recipient)
            .map(|m| m.text.clone())
            .collect()
    }

    /// Removes and returns everything captured so far.
    pub async fn take(&self) -> Vec<OutboundMessage> {
        std::mem::take(&mut *self.sent.lock().await)
    }
}

#[async_trait]
impl PluginAdapter for MockSender {
    fn name(&self) -> &str {
        "mock-sender"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, MeterwiseError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MeterwiseError> {
        Ok(())
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send(&self, msg: &OutboundMessage) -> Result<(), MeterwiseError> {
        self.sent.lock().await.push(msg.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(MeterwiseError::Channel {
                message: "mock send failure".into(),
                source: None,
            });
        }
        Ok(())
    }
}
