// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot-assisted / human-escalated conversation state.
//!
//! The state is never stored on its own: it is read from the subscriber's
//! escalation deadline at the moment a message arrives. There is no timer;
//! a deadline that has passed simply stops matching on the next check.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use meterwise_core::{
    ChannelIdentity, MessageSender, MeterwiseError, Subscriber, SubscriberStore, TicketingAdapter,
};
use tracing::{info, warn};

use crate::delivery::deliver;
use crate::replies;

/// Conversation state derived from `escalation_until` at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    BotAssisted,
    HumanEscalated { until: DateTime<Utc> },
}

impl ConversationState {
    pub fn at(subscriber: &Subscriber, now: DateTime<Utc>) -> Self {
        match subscriber.escalation_until {
            Some(until) if until > now => ConversationState::HumanEscalated { until },
            _ => ConversationState::BotAssisted,
        }
    }
}

/// Drives escalation transitions and the ticketing relay.
pub struct EscalationManager {
    store: Arc<dyn SubscriberStore>,
    ticketing: Arc<dyn TicketingAdapter>,
    sender: Arc<dyn MessageSender>,
    window: TimeDelta,
}

impl EscalationManager {
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        ticketing: Arc<dyn TicketingAdapter>,
        sender: Arc<dyn MessageSender>,
        window_minutes: i64,
    ) -> Self {
        Self {
            store,
            ticketing,
            sender,
            window: TimeDelta::minutes(window_minutes),
        }
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// BotAssisted -> HumanEscalated: relay, open the window, tell the user.
    pub async fn escalate(
        &self,
        subscriber: &Subscriber,
        identity: &ChannelIdentity,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, MeterwiseError> {
        self.relay(subscriber, text).await;
        let until = now + self.window;
        self.store.set_escalation(&subscriber.id, Some(until)).await?;
        info!(subscriber_id = %subscriber.id, %until, "conversation escalated to a human agent");
        deliver(self.sender.as_ref(), identity, replies::TRANSFERRING).await;
        Ok(until)
    }

    /// HumanEscalated on a new message: relay and slide the whole window
    /// forward from `now`. No bot reply is sent.
    pub async fn continue_escalated(
        &self,
        subscriber: &Subscriber,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, MeterwiseError> {
        self.relay(subscriber, text).await;
        let until = now + self.window;
        self.store.set_escalation(&subscriber.id, Some(until)).await?;
        info!(subscriber_id = %subscriber.id, %until, "escalation window extended");
        Ok(until)
    }

    /// HumanEscalated -> BotAssisted on the helpdesk's resolved signal.
    ///
    /// Returns false when no subscriber is bound to `identity`.
    pub async fn resolve(&self, identity: &ChannelIdentity) -> Result<bool, MeterwiseError> {
        let Some(subscriber) = self.store.find_by_channel(identity).await? else {
            warn!(identity = %identity, "resolved conversation for an unknown chat");
            return Ok(false);
        };
        self.store.set_escalation(&subscriber.id, None).await?;
        info!(subscriber_id = %subscriber.id, "conversation resolved, bot resumed");
        deliver(self.sender.as_ref(), identity, replies::BOT_RESUMED).await;
        Ok(true)
    }

    /// Forwards a human agent's reply to the chat.
    pub async fn forward_agent_reply(&self, identity: &ChannelIdentity, text: &str) {
        deliver(self.sender.as_ref(), identity, text).await;
    }

    async fn relay(&self, subscriber: &Subscriber, text: &str) {
        if let Err(e) = self.ticketing.relay(subscriber, text).await {
            warn!(subscriber_id = %subscriber.id, error = %e, "ticketing relay failed");
        }
    }
}
