// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Meterwise integration tests.
//!
//! Mock collaborators and a harness that runs the full assistant against a
//! temporary SQLite database, with no network access.
//!
//! # Components
//!
//! - [`MockSender`] - captures outbound chat messages
//! - [`MockTimeSeries`] - constant-load time-series source
//! - [`MockClassifier`] - scripted intent classifier and FAQ responder
//! - [`MockTicketing`], [`MockMailer`] - record relays and link-code emails
//! - [`ManualClock`] - settable clock
//! - [`TestHarness`] - the assembled assistant

pub mod clock;
pub mod harness;
pub mod mock_channel;
pub mod mock_services;

pub use clock::ManualClock;
pub use harness::{TestHarness, TestHarnessBuilder, sample_subscriber};
pub use mock_channel::MockSender;
pub use mock_services::{MockClassifier, MockMailer, MockTicketing, MockTimeSeries};
