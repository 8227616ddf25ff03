// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscriber store trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::MeterwiseError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChannelIdentity, Device, Subscriber};

/// Read/update access to subscriber records.
///
/// Records are created elsewhere; the assistant only touches channel
/// binding, escalation deadline, link-code and preference fields.
#[async_trait]
pub trait SubscriberStore: PluginAdapter {
    async fn get_subscriber(&self, id: &str) -> Result<Option<Subscriber>, MeterwiseError>;

    async fn find_by_channel(
        &self,
        identity: &ChannelIdentity,
    ) -> Result<Option<Subscriber>, MeterwiseError>;

    /// Email lookup is case-insensitive.
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, MeterwiseError>;

    /// First active device of a subscriber.
    async fn primary_device(&self, subscriber_id: &str) -> Result<Option<Device>, MeterwiseError>;

    /// Stores a one-time link code, replacing any outstanding one.
    async fn set_link_code(
        &self,
        subscriber_id: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), MeterwiseError>;

    /// Atomically binds `identity` to the subscriber holding `code`, if the
    /// code exists and `expires_at > now`, clearing the code and its expiry.
    ///
    /// Returns the updated subscriber, or `None` when no valid code matched.
    async fn consume_link_code(
        &self,
        code: &str,
        identity: &ChannelIdentity,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscriber>, MeterwiseError>;

    async fn set_escalation(
        &self,
        subscriber_id: &str,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), MeterwiseError>;

    async fn set_channel_preference(
        &self,
        subscriber_id: &str,
        prefers_telegram: bool,
    ) -> Result<(), MeterwiseError>;
}
