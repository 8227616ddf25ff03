// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite subscriber store for Meterwise.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer connection
//! through `tokio-rusqlite`. Exposes [`SqliteSubscriberStore`], the
//! production implementation of `meterwise_core::SubscriberStore`.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteSubscriberStore;
pub use database::Database;
