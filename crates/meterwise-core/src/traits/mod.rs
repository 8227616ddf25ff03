// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! Every collaborator extends the [`PluginAdapter`] base trait and uses
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod classifier;
pub mod mailer;
pub mod sender;
pub mod store;
pub mod ticketing;
pub mod timeseries;

pub use adapter::PluginAdapter;
pub use classifier::{FaqResponder, IntentClassifier};
pub use mailer::LinkCodeMailer;
pub use sender::MessageSender;
pub use store::SubscriberStore;
pub use ticketing::TicketingAdapter;
pub use timeseries::TimeSeriesSource;
