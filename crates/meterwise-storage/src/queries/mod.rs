// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query functions. Each takes a [`Database`](crate::Database) and
//! runs on its single connection thread.

pub mod devices;
pub mod subscribers;
