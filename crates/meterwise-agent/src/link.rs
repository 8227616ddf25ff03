// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-time-code binding of a chat identity to a subscriber.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, TimeDelta, Utc};
use meterwise_core::{
    ChannelIdentity, LinkCodeEmail, LinkCodeMailer, MeterwiseError, Subscriber, SubscriberStore,
};
use rand::Rng;
use rand::rngs::OsRng;
use regex::Regex;
use tracing::info;

use crate::replies;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static LINK_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{6}$").unwrap());

pub fn looks_like_email(text: &str) -> bool {
    EMAIL.is_match(text)
}

pub fn looks_like_link_code(text: &str) -> bool {
    LINK_CODE.is_match(text)
}

/// Result of one step of the link flow.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    /// A fresh code was stored and emailed.
    CodeSent,
    /// The chat is already bound to the subscriber owning the email.
    AlreadyLinked { name: String },
    UnknownEmail,
    Linked(Box<Subscriber>),
    /// No live code matched.
    CodeRejected,
}

impl LinkOutcome {
    pub fn reply(&self) -> String {
        match self {
            LinkOutcome::CodeSent => replies::CODE_SENT.to_string(),
            LinkOutcome::AlreadyLinked { name } => replies::already_linked(name),
            LinkOutcome::UnknownEmail => replies::EMAIL_NOT_FOUND.to_string(),
            LinkOutcome::Linked(subscriber) => replies::linked(&subscriber.name),
            LinkOutcome::CodeRejected => replies::CODE_REJECTED.to_string(),
        }
    }
}

pub struct LinkFlow {
    store: Arc<dyn SubscriberStore>,
    mailer: Arc<dyn LinkCodeMailer>,
    ttl: TimeDelta,
}

impl LinkFlow {
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        mailer: Arc<dyn LinkCodeMailer>,
        code_ttl_minutes: i64,
    ) -> Self {
        Self {
            store,
            mailer,
            ttl: TimeDelta::minutes(code_ttl_minutes),
        }
    }

    /// Issues a new code for the subscriber registered under `email`,
    /// replacing any outstanding one.
    pub async fn request_code(
        &self,
        identity: &ChannelIdentity,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<LinkOutcome, MeterwiseError> {
        let Some(subscriber) = self.store.find_by_email(email).await? else {
            return Ok(LinkOutcome::UnknownEmail);
        };
        if subscriber.channel_identity.as_ref() == Some(identity) {
            return Ok(LinkOutcome::AlreadyLinked {
                name: subscriber.name,
            });
        }

        let code = generate_code();
        self.store
            .set_link_code(&subscriber.id, &code, now + self.ttl)
            .await?;
        self.mailer
            .send_link_code(&LinkCodeEmail {
                to: subscriber.email.clone(),
                name: subscriber.name.clone(),
                code,
                ttl_minutes: self.ttl.num_minutes(),
            })
            .await?;
        info!(subscriber_id = %subscriber.id, "link code issued");
        Ok(LinkOutcome::CodeSent)
    }

    /// Binds `identity` if `code` is live; the code is single-use.
    pub async fn confirm_code(
        &self,
        identity: &ChannelIdentity,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<LinkOutcome, MeterwiseError> {
        match self.store.consume_link_code(code, identity, now).await? {
            Some(subscriber) => {
                info!(subscriber_id = %subscriber.id, identity = %identity, "chat linked");
                Ok(LinkOutcome::Linked(Box::new(subscriber)))
            }
            None => Ok(LinkOutcome::CodeRejected),
        }
    }
}

/// Six random digits, zero-padded.
fn generate_code() -> String {
    format!("{:06}", OsRng.gen_range(0..1_000_000u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("ana@example.com"));
        assert!(looks_like_email("a.b+c@sub.example.mx"));
        assert!(!looks_like_email("ana@example"));
        assert!(!looks_like_email("ana @example.com"));
        assert!(!looks_like_email("hola"));
    }

    #[test]
    fn code_shapes() {
        assert!(looks_like_link_code("012345"));
        assert!(!looks_like_link_code("12345"));
        assert!(!looks_like_link_code("1234567"));
        assert!(!looks_like_link_code("12a456"));
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..200 {
            assert!(looks_like_link_code(&generate_code()));
        }
    }
}
