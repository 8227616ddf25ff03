// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message routing for the Meterwise assistant.
//!
//! This crate provides:
//! - [`parse_command`]: exact-match command table (zero-cost, no network)
//! - [`IntentRouter`]: command match first, then the external classifier
//! - [`GeminiClient`]: Gemini-backed intent classifier and FAQ responder
//!
//! Every classifier label maps onto exactly one [`Action`]; adding an
//! [`Intent`](meterwise_core::Intent) variant fails to compile until it is routed.

pub mod commands;
pub mod gemini;
pub mod router;

pub use commands::{Command, parse_command};
pub use gemini::GeminiClient;
pub use router::{Action, IntentRouter, RouteSource, RoutingDecision};
