// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Out-of-band delivery of channel-link codes.

use async_trait::async_trait;

use crate::error::MeterwiseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::LinkCodeEmail;

#[async_trait]
pub trait LinkCodeMailer: PluginAdapter {
    async fn send_link_code(&self, email: &LinkCodeEmail) -> Result<(), MeterwiseError>;
}
