// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the collaborator traits and the assistant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier a messaging transport assigns to a chat participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelIdentity(pub String);

impl ChannelIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Health status reported by collaborator health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Collaborator is fully operational.
    Healthy,
    /// Collaborator is reachable but degraded (e.g. running without credentials).
    Degraded(String),
    /// Collaborator is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
    TimeSeries,
    Classifier,
    Ticketing,
    Mailer,
}

/// Which month numbers close a bimonthly billing period.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BillingParity {
    Even,
    Odd,
}

impl BillingParity {
    /// Returns true when `month` (1-12) belongs to this parity.
    pub fn matches_month(self, month: u32) -> bool {
        match self {
            BillingParity::Even => month % 2 == 0,
            BillingParity::Odd => month % 2 == 1,
        }
    }
}

/// Externally maintained voltage quality flag.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoltageState {
    #[default]
    Normal,
    High,
    Low,
}

/// Measurement fields recorded by metering devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MeasurementField {
    Voltage,
    Power,
}

/// A customer record as seen by the assistant.
///
/// Created and mostly maintained by external systems. The assistant only
/// writes the channel identity, escalation deadline, link-code fields and
/// channel preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Billing-cycle cutoff day of month (1-31).
    pub cutoff_day: u32,
    pub parity: BillingParity,
    pub service_start: Option<NaiveDate>,
    pub tariff_code: String,
    /// Meter reading taken at installation, used only in the first period.
    pub initial_reading: Option<f64>,
    /// Meter reading that closed the period before installation.
    pub prior_closing_reading: Option<f64>,
    pub channel_identity: Option<ChannelIdentity>,
    pub prefers_telegram: bool,
    /// `None` or a past instant means bot-assisted.
    pub escalation_until: Option<DateTime<Utc>>,
    pub link_code: Option<String>,
    pub link_code_expires_at: Option<DateTime<Utc>>,
    pub leak_active: bool,
    pub voltage_state: VoltageState,
    pub next_payment_date: Option<NaiveDate>,
}

impl Subscriber {
    /// True while the escalation deadline is still in the future at `now`.
    pub fn is_escalated(&self, now: DateTime<Utc>) -> bool {
        self.escalation_until.is_some_and(|until| until > now)
    }

    /// Carry-over meter readings, present only when both were recorded.
    pub fn carry_over_readings(&self) -> Option<(f64, f64)> {
        match (self.initial_reading, self.prior_closing_reading) {
            (Some(initial), Some(prior)) => Some((initial, prior)),
            _ => None,
        }
    }
}

/// A metering device bound to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub subscriber_id: String,
    pub active: bool,
}

/// One aggregated or raw time-series point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }
}

/// Half-open UTC time range `[start, stop)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        Self { start, stop }
    }
}

/// A text message addressed to a channel identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: ChannelIdentity,
    pub text: String,
}

impl OutboundMessage {
    pub fn new(recipient: ChannelIdentity, text: impl Into<String>) -> Self {
        Self {
            recipient,
            text: text.into(),
        }
    }
}

/// Contents of an out-of-band link-code email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCodeEmail {
    pub to: String,
    pub name: String,
    pub code: String,
    pub ttl_minutes: i64,
}

/// A helpdesk webhook event, reduced to what the assistant acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketingEvent {
    /// An agent closed the conversation; the bot takes over again.
    Resolved { identity: ChannelIdentity },
    /// A public agent reply to forward to the chat.
    AgentReply {
        identity: ChannelIdentity,
        text: String,
    },
    /// Anything else the helpdesk reports.
    Ignored,
}
