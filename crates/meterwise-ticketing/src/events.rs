// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatwoot webhook payloads.

use meterwise_core::{ChannelIdentity, TicketingEvent};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
struct WebhookPayload {
    event: Option<String>,
    message_type: Option<String>,
    #[serde(default)]
    private: bool,
    content: Option<String>,
    status: Option<String>,
    conversation: Option<ConversationRef>,
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct ConversationRef {
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    sender: Option<Contact>,
}

#[derive(Debug, Deserialize)]
struct Contact {
    identifier: Option<Value>,
}

impl Meta {
    /// The contact identifier, which carries the chat identity.
    fn identity(&self) -> Option<ChannelIdentity> {
        let identifier = self.sender.as_ref()?.identifier.as_ref()?;
        let raw = match identifier {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!raw.is_empty()).then(|| ChannelIdentity(raw))
    }
}

/// Reduces a webhook body to a [`TicketingEvent`].
///
/// Malformed or uninteresting payloads become [`TicketingEvent::Ignored`];
/// this never fails.
pub fn parse_event(payload: &Value) -> TicketingEvent {
    let payload = match WebhookPayload::deserialize(payload) {
        Ok(p) => p,
        Err(e) => {
            debug!(error = %e, "unparseable ticketing webhook");
            return TicketingEvent::Ignored;
        }
    };

    match payload.event.as_deref() {
        Some("message_created") => agent_reply(payload),
        Some("conversation_status_changed") => resolution(payload),
        other => {
            debug!(event = ?other, "ticketing event ignored");
            TicketingEvent::Ignored
        }
    }
}

fn agent_reply(payload: WebhookPayload) -> TicketingEvent {
    if payload.message_type.as_deref() != Some("outgoing") || payload.private {
        return TicketingEvent::Ignored;
    }
    let identity = payload
        .conversation
        .as_ref()
        .and_then(|c| c.meta.as_ref())
        .and_then(Meta::identity);
    let Some(identity) = identity else {
        warn!("agent reply without a contact identifier");
        return TicketingEvent::Ignored;
    };
    match payload.content.filter(|c| !c.trim().is_empty()) {
        Some(text) => TicketingEvent::AgentReply { identity, text },
        None => {
            warn!(identity = %identity, "agent reply without text content, not forwarded");
            TicketingEvent::Ignored
        }
    }
}

fn resolution(payload: WebhookPayload) -> TicketingEvent {
    if payload.status.as_deref() != Some("resolved") {
        return TicketingEvent::Ignored;
    }
    match payload.meta.as_ref().and_then(Meta::identity) {
        Some(identity) => TicketingEvent::Resolved { identity },
        None => {
            warn!("conversation resolved but no contact identifier was sent");
            TicketingEvent::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn agent_message(content: Value, private: bool) -> Value {
        json!({
            "event": "message_created",
            "message_type": "outgoing",
            "private": private,
            "content": content,
            "conversation": { "id": 7, "meta": { "sender": { "identifier": "12345" } } }
        })
    }

    #[test]
    fn public_outgoing_message_is_an_agent_reply() {
        assert_eq!(
            parse_event(&agent_message(json!("Hola, ¿en qué te ayudo?"), false)),
            TicketingEvent::AgentReply {
                identity: ChannelIdentity::from("12345"),
                text: "Hola, ¿en qué te ayudo?".into(),
            }
        );
    }

    #[test]
    fn private_notes_are_not_forwarded() {
        assert_eq!(
            parse_event(&agent_message(json!("nota interna"), true)),
            TicketingEvent::Ignored
        );
    }

    #[test]
    fn empty_agent_message_is_ignored() {
        assert_eq!(
            parse_event(&agent_message(Value::Null, false)),
            TicketingEvent::Ignored
        );
    }

    #[test]
    fn incoming_messages_are_ignored() {
        let mut payload = agent_message(json!("eco"), false);
        payload["message_type"] = json!("incoming");
        assert_eq!(parse_event(&payload), TicketingEvent::Ignored);
    }

    #[test]
    fn resolved_status_carries_identity() {
        let payload = json!({
            "event": "conversation_status_changed",
            "status": "resolved",
            "meta": { "sender": { "identifier": 987654 } }
        });
        assert_eq!(
            parse_event(&payload),
            TicketingEvent::Resolved {
                identity: ChannelIdentity::from("987654")
            }
        );
    }

    #[test]
    fn other_status_changes_are_ignored() {
        let payload = json!({
            "event": "conversation_status_changed",
            "status": "pending",
            "meta": { "sender": { "identifier": "1" } }
        });
        assert_eq!(parse_event(&payload), TicketingEvent::Ignored);
    }

    #[test]
    fn resolution_without_identifier_is_ignored() {
        let payload = json!({
            "event": "conversation_status_changed",
            "status": "resolved",
            "meta": { "sender": { "identifier": null } }
        });
        assert_eq!(parse_event(&payload), TicketingEvent::Ignored);
    }

    #[test]
    fn malformed_payloads_are_ignored() {
        assert_eq!(parse_event(&json!([1, 2, 3])), TicketingEvent::Ignored);
        assert_eq!(parse_event(&json!({ "event": 5 })), TicketingEvent::Ignored);
        assert_eq!(
            parse_event(&json!({ "event": "contact_created" })),
            TicketingEvent::Ignored
        );
    }
}
