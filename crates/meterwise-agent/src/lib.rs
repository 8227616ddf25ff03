// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Meterwise conversational assistant.
//!
//! [`Assistant`] receives one chat message at a time, links unknown chats to
//! subscribers, keeps escalated conversations with the helpdesk, and answers
//! everything else through the intent router and the metering handlers.

pub mod assistant;
pub mod charts;
pub mod delivery;
pub mod escalation;
pub mod handlers;
pub mod link;
pub mod locks;
pub mod replies;
pub mod shutdown;

pub use assistant::{Assistant, Collaborators};
pub use escalation::{ConversationState, EscalationManager};
pub use handlers::{HandlerOutcome, Handlers};
pub use link::{LinkFlow, LinkOutcome};
pub use shutdown::install_signal_handler;
