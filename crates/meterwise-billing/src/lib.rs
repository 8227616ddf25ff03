// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billing arithmetic for Meterwise.
//!
//! Pure functions only: bimonthly cutoff dates, progressive tariff pricing,
//! and the period-end bill projection built on both.

pub mod cycle;
pub mod projection;
pub mod tariff;

pub use cycle::{BillingCycle, add_months_clamped, cutoff_dates, days_in_month};
pub use projection::{BillProjection, project_bill};
pub use tariff::{TariffBracket, TariffTable};
