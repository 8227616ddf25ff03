// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound Telegram updates reduced to `(identity, text)`.

use meterwise_core::ChannelIdentity;
use serde::Deserialize;
use serde_json::Value;
use teloxide::types::Message;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct WebhookUpdate {
    message: Option<WebhookMessage>,
}

#[derive(Debug, Deserialize)]
struct WebhookMessage {
    chat: WebhookChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookChat {
    id: i64,
}

/// An inbound text message ready for the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    pub identity: ChannelIdentity,
    pub text: String,
}

impl InboundText {
    fn new(chat_id: i64, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            identity: ChannelIdentity(chat_id.to_string()),
            text: text.to_string(),
        })
    }
}

/// Extracts the text message from a webhook update body.
///
/// Returns `None` for edited messages, callbacks, media without text and
/// anything that is not a Telegram update.
pub fn parse_update(body: &Value) -> Option<InboundText> {
    let update = match WebhookUpdate::deserialize(body) {
        Ok(update) => update,
        Err(e) => {
            debug!(error = %e, "ignoring malformed Telegram update");
            return None;
        }
    };
    let message = update.message?;
    InboundText::new(message.chat.id, message.text.as_deref()?)
}

/// Extracts the text from a message delivered by long polling.
pub fn from_message(msg: &Message) -> Option<InboundText> {
    InboundText::new(msg.chat.id.0, msg.text()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_message_is_extracted() {
        let body = json!({
            "update_id": 1,
            "message": {
                "message_id": 5,
                "date": 1712793600,
                "chat": { "id": 4242, "type": "private" },
                "from": { "id": 4242, "is_bot": false, "first_name": "Ana" },
                "text": "  voltaje \n"
            }
        });
        assert_eq!(
            parse_update(&body),
            Some(InboundText {
                identity: ChannelIdentity::from("4242"),
                text: "voltaje".into(),
            })
        );
    }

    #[test]
    fn photo_without_text_is_ignored() {
        let body = json!({
            "update_id": 2,
            "message": { "chat": { "id": 1 }, "photo": [{ "file_id": "x" }] }
        });
        assert_eq!(parse_update(&body), None);
    }

    #[test]
    fn non_message_updates_are_ignored() {
        let body = json!({
            "update_id": 3,
            "edited_message": { "chat": { "id": 1 }, "text": "editado" }
        });
        assert_eq!(parse_update(&body), None);
        assert_eq!(parse_update(&json!("basura")), None);
        assert_eq!(parse_update(&json!({ "message": { "text": "sin chat" } })), None);
    }

    #[test]
    fn blank_text_is_ignored() {
        let body = json!({ "message": { "chat": { "id": 1 }, "text": "   " } });
        assert_eq!(parse_update(&body), None);
    }
}
