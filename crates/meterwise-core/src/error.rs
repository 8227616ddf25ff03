// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Meterwise assistant.

use thiserror::Error;

use crate::types::BillingParity;

/// The primary error type used across all Meterwise collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum MeterwiseError {
    /// Configuration errors (invalid TOML, missing credentials, bad tariff tables).
    #[error("configuration error: {0}")]
    Config(String),

    /// Subscriber store errors (database connection, query failure, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Message delivery errors.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Time-series query errors (network failure, malformed response).
    #[error("time-series error: {message}")]
    TimeSeries {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Intent classifier or FAQ responder errors.
    #[error("classifier error: {message}")]
    Classifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Ticketing/helpdesk errors.
    #[error("ticketing error: {message}")]
    Ticketing {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Out-of-band email delivery errors.
    #[error("mailer error: {message}")]
    Mailer {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No cutoff date could be derived for a subscriber's billing settings.
    #[error("no billing cutoff found for day {cutoff_day} with {parity} parity")]
    BillingCycle {
        cutoff_day: u32,
        parity: BillingParity,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MeterwiseError {
    /// Builds a [`MeterwiseError::TimeSeries`] without an underlying source.
    pub fn time_series(message: impl Into<String>) -> Self {
        Self::TimeSeries {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a [`MeterwiseError::Classifier`] without an underlying source.
    pub fn classifier(message: impl Into<String>) -> Self {
        Self::Classifier {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a [`MeterwiseError::Ticketing`] without an underlying source.
    pub fn ticketing(message: impl Into<String>) -> Self {
        Self::Ticketing {
            message: message.into(),
            source: None,
        }
    }
}
