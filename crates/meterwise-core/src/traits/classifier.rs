// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Free-text intent classification and FAQ answering.

use async_trait::async_trait;

use crate::error::MeterwiseError;
use crate::intent::Intent;
use crate::traits::adapter::PluginAdapter;

/// Maps free text onto the closed [`Intent`] set.
#[async_trait]
pub trait IntentClassifier: PluginAdapter {
    async fn classify(&self, text: &str) -> Result<Intent, MeterwiseError>;
}

/// Produces a short free-text answer to a question about the service.
#[async_trait]
pub trait FaqResponder: PluginAdapter {
    async fn answer(&self, question: &str) -> Result<String, MeterwiseError>;
}
