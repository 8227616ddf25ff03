// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Meterwise.
//!
//! Receives Telegram and helpdesk webhooks and hands them to the assistant.
//! Webhooks are always acknowledged with 200 so transports never retry.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, router, serve};
