// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatwoot helpdesk integration for Meterwise.
//!
//! [`ChatwootClient`] relays subscriber messages into a helpdesk inbox while
//! a conversation is escalated. [`parse_event`] reduces Chatwoot webhook
//! payloads to the two events the assistant acts on: an agent reply and a
//! resolved conversation.

pub mod client;
pub mod events;

pub use client::ChatwootClient;
pub use events::parse_event;
