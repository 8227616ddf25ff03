// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Meterwise metering assistant.
//!
//! This crate provides the collaborator trait definitions, error types, and
//! domain types shared across the Meterwise workspace. Every external system
//! the assistant talks to sits behind a trait defined here.

pub mod clock;
pub mod error;
pub mod intent;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, SystemClock};
pub use error::MeterwiseError;
pub use intent::Intent;
pub use types::{
    AdapterType, BillingParity, ChannelIdentity, Device, HealthStatus, LinkCodeEmail,
    MeasurementField, OutboundMessage, Sample, Subscriber, TicketingEvent, TimeRange, VoltageState,
};

// Re-export all collaborator traits at crate root.
pub use traits::{
    FaqResponder, IntentClassifier, LinkCodeMailer, MessageSender, PluginAdapter,
    SubscriberStore, TicketingAdapter, TimeSeriesSource,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn subscriber() -> Subscriber {
        Subscriber {
            id: "sub-1".into(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            phone: None,
            cutoff_day: 15,
            parity: BillingParity::Even,
            service_start: None,
            tariff_code: "01".into(),
            initial_reading: None,
            prior_closing_reading: None,
            channel_identity: None,
            prefers_telegram: false,
            escalation_until: None,
            link_code: None,
            link_code_expires_at: None,
            leak_active: false,
            voltage_state: VoltageState::Normal,
            next_payment_date: None,
        }
    }

    #[test]
    fn meterwise_error_has_all_variants() {
        let _config = MeterwiseError::Config("test".into());
        let _storage = MeterwiseError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = MeterwiseError::Channel {
            message: "test".into(),
            source: None,
        };
        let _ts = MeterwiseError::time_series("test");
        let _classifier = MeterwiseError::classifier("test");
        let _ticketing = MeterwiseError::ticketing("test");
        let _mailer = MeterwiseError::Mailer {
            message: "test".into(),
            source: None,
        };
        let cycle = MeterwiseError::BillingCycle {
            cutoff_day: 31,
            parity: BillingParity::Odd,
        };
        assert!(cycle.to_string().contains("odd"));
        let _internal = MeterwiseError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips_through_display() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Channel,
            AdapterType::Storage,
            AdapterType::TimeSeries,
            AdapterType::Classifier,
            AdapterType::Ticketing,
            AdapterType::Mailer,
        ];
        for variant in &variants {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("no token".into());
        assert_ne!(healthy, degraded);
        assert!(matches!(
            HealthStatus::Unhealthy("down".into()),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[test]
    fn parity_matches_month_numbers() {
        assert!(BillingParity::Even.matches_month(2));
        assert!(BillingParity::Even.matches_month(12));
        assert!(!BillingParity::Even.matches_month(1));
        assert!(BillingParity::Odd.matches_month(1));
        assert!(BillingParity::Odd.matches_month(11));
        assert_eq!(BillingParity::Odd.to_string(), "odd");
    }

    #[test]
    fn escalation_is_strictly_before_deadline() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut sub = subscriber();
        assert!(!sub.is_escalated(now));

        sub.escalation_until = Some(now + Duration::minutes(1));
        assert!(sub.is_escalated(now));

        sub.escalation_until = Some(now);
        assert!(!sub.is_escalated(now), "deadline equal to now is expired");
    }

    #[test]
    fn carry_over_requires_both_readings() {
        let mut sub = subscriber();
        sub.initial_reading = Some(1250.0);
        assert_eq!(sub.carry_over_readings(), None);
        sub.prior_closing_reading = Some(1200.0);
        assert_eq!(sub.carry_over_readings(), Some((1250.0, 1200.0)));
    }

    #[test]
    fn subscriber_serializes_parity_lowercase() {
        let json = serde_json::to_value(subscriber()).unwrap();
        assert_eq!(json["parity"], "even");
        assert_eq!(json["voltage_state"], "normal");
    }
}
