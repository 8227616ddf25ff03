// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inbound message pipeline.
//!
//! Order of checks for each message:
//!
//! 1. Escalated subscriber -> relay to the helpdesk, no reply, whatever the
//!    text looks like.
//! 2. `/start` -> welcome.
//! 3. An email address -> link-code request.
//! 4. A six-digit code -> link-code confirmation.
//! 5. Unlinked chat -> instructions to link.
//! 6. No active device -> contact support.
//! 7. Command or classified intent -> handler.
//!
//! Any error along the way produces one generic reply and a log line.
//! Messages from the same chat are processed one at a time.

use std::sync::Arc;

use meterwise_billing::TariffTable;
use meterwise_config::model::MeterwiseConfig;
use meterwise_core::{
    ChannelIdentity, Clock, FaqResponder, IntentClassifier, LinkCodeMailer, MessageSender,
    MeterwiseError, SubscriberStore, TicketingAdapter, TicketingEvent, TimeSeriesSource,
};
use meterwise_metering::{ConsumptionAggregator, Diagnostician, LocalCalendar};
use meterwise_router::IntentRouter;
use tracing::{debug, error, info};

use crate::charts::ChartLinks;
use crate::delivery::deliver;
use crate::escalation::{ConversationState, EscalationManager};
use crate::handlers::{HandlerOutcome, Handlers, Turn};
use crate::link::{LinkFlow, looks_like_email, looks_like_link_code};
use crate::locks::IdentityLocks;
use crate::replies;

/// External systems the assistant talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn SubscriberStore>,
    pub timeseries: Arc<dyn TimeSeriesSource>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub faq: Arc<dyn FaqResponder>,
    pub sender: Arc<dyn MessageSender>,
    pub ticketing: Arc<dyn TicketingAdapter>,
    pub mailer: Arc<dyn LinkCodeMailer>,
    pub clock: Arc<dyn Clock>,
}

pub struct Assistant {
    store: Arc<dyn SubscriberStore>,
    sender: Arc<dyn MessageSender>,
    clock: Arc<dyn Clock>,
    router: IntentRouter,
    link: LinkFlow,
    escalation: EscalationManager,
    handlers: Handlers,
    locks: IdentityLocks,
}

impl Assistant {
    /// Wires the pipeline from configuration and collaborators.
    pub fn new(config: &MeterwiseConfig, c: Collaborators) -> Result<Self, MeterwiseError> {
        let calendar = LocalCalendar::from_offset_minutes(config.service.utc_offset_minutes)?;
        let aggregator = ConsumptionAggregator::new(Arc::clone(&c.timeseries), calendar);
        let diagnostician = Diagnostician::new(
            Arc::clone(&c.timeseries),
            calendar,
            config.diagnostics.clone(),
        );
        let handlers = Handlers::new(
            Arc::clone(&c.store),
            Arc::clone(&c.timeseries),
            Arc::clone(&c.sender),
            c.faq,
            aggregator,
            diagnostician,
            TariffTable::from_config(&config.tariff),
            ChartLinks::new(&config.charts),
        );

        Ok(Self {
            router: IntentRouter::new(c.classifier),
            link: LinkFlow::new(Arc::clone(&c.store), c.mailer, config.link.code_ttl_minutes),
            escalation: EscalationManager::new(
                Arc::clone(&c.store),
                c.ticketing,
                Arc::clone(&c.sender),
                config.escalation.window_minutes,
            ),
            handlers,
            store: c.store,
            sender: c.sender,
            clock: c.clock,
            locks: IdentityLocks::new(),
        })
    }

    /// Entry point for one inbound chat message. Never fails outward.
    pub async fn handle_inbound_message(&self, identity: &ChannelIdentity, text: &str) {
        let _guard = self.locks.acquire(identity).await;
        if let Err(e) = self.process(identity, text.trim()).await {
            error!(identity = %identity, error = %e, "inbound message handling failed");
            self.reply(identity, replies::SERVER_ERROR).await;
        }
    }

    /// Applies a helpdesk webhook event. Never fails outward.
    pub async fn handle_ticketing_event(&self, event: TicketingEvent) {
        match event {
            TicketingEvent::Resolved { identity } => {
                let _guard = self.locks.acquire(&identity).await;
                if let Err(e) = self.escalation.resolve(&identity).await {
                    error!(identity = %identity, error = %e, "failed to resolve escalation");
                }
            }
            TicketingEvent::AgentReply { identity, text } => {
                self.escalation.forward_agent_reply(&identity, &text).await;
            }
            TicketingEvent::Ignored => debug!("ticketing event ignored"),
        }
    }

    async fn process(&self, identity: &ChannelIdentity, text: &str) -> Result<(), MeterwiseError> {
        let now = self.clock.now();
        let subscriber = self.store.find_by_channel(identity).await?;

        if let Some(sub) = &subscriber {
            if let ConversationState::HumanEscalated { .. } = ConversationState::at(sub, now) {
                self.escalation.continue_escalated(sub, text, now).await?;
                return Ok(());
            }
        }

        if text.split_whitespace().next() == Some("/start") {
            self.reply(identity, replies::WELCOME).await;
            return Ok(());
        }
        if looks_like_email(text) {
            let outcome = self
                .link
                .request_code(identity, &text.to_lowercase(), now)
                .await?;
            self.reply(identity, &outcome.reply()).await;
            return Ok(());
        }
        if looks_like_link_code(text) {
            let outcome = self.link.confirm_code(identity, text, now).await?;
            self.reply(identity, &outcome.reply()).await;
            return Ok(());
        }

        let Some(subscriber) = subscriber else {
            self.reply(identity, replies::NOT_LINKED).await;
            return Ok(());
        };

        let Some(device) = self.store.primary_device(&subscriber.id).await? else {
            self.reply(identity, replies::NO_ACTIVE_DEVICE).await;
            return Ok(());
        };

        let decision = self.router.route(text).await;
        info!(
            subscriber_id = %subscriber.id,
            action = %decision.action,
            source = ?decision.source,
            "message routed"
        );

        let turn = Turn {
            identity,
            subscriber: &subscriber,
            device: &device,
            text,
            now,
        };
        match self.handlers.run(decision.action, &turn).await? {
            HandlerOutcome::Reply(texts) => {
                for text in texts {
                    self.reply(identity, &text).await;
                }
            }
            HandlerOutcome::Escalate => {
                self.escalation
                    .escalate(&subscriber, identity, text, now)
                    .await?;
            }
        }
        Ok(())
    }

    async fn reply(&self, identity: &ChannelIdentity, text: &str) {
        deliver(self.sender.as_ref(), identity, text).await;
    }
}
