// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent routing: command table first, external classifier second.

use std::sync::Arc;

use meterwise_core::{Intent, IntentClassifier};
use strum::Display;
use tracing::{info, warn};

use crate::commands::{Command, parse_command};

/// What the assistant should do with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    LatestVoltage,
    LatestPower,
    ConsumptionToday,
    ConsumptionYesterday,
    DailyChart,
    WeeklyChart,
    SetChannelPreference { prefers_telegram: bool },
    BillProjection,
    LeakDiagnosis,
    PhantomLoadDiagnosis,
    VoltageDiagnosis,
    PeakHour,
    CutoffDate,
    RenewalDate,
    CompanyFaq,
    /// Hand the conversation to a human.
    Escalate,
    /// Static capability list.
    Help,
}

impl From<Command> for Action {
    fn from(command: Command) -> Self {
        match command {
            Command::Voltage => Action::LatestVoltage,
            Command::Power => Action::LatestPower,
            Command::ConsumptionToday => Action::ConsumptionToday,
            Command::ConsumptionYesterday => Action::ConsumptionYesterday,
            Command::DailyChart => Action::DailyChart,
            Command::WeeklyChart => Action::WeeklyChart,
            Command::UseTelegram => Action::SetChannelPreference {
                prefers_telegram: true,
            },
            Command::UseWhatsapp => Action::SetChannelPreference {
                prefers_telegram: false,
            },
        }
    }
}

impl From<Intent> for Action {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::HumanSupport => Action::Escalate,
            Intent::BillProjection => Action::BillProjection,
            Intent::LeakDiagnosis => Action::LeakDiagnosis,
            Intent::PhantomLoadDiagnosis => Action::PhantomLoadDiagnosis,
            Intent::VoltageDiagnosis => Action::VoltageDiagnosis,
            Intent::PeakHour => Action::PeakHour,
            Intent::CutoffDate => Action::CutoffDate,
            Intent::RenewalDate => Action::RenewalDate,
            Intent::CompanyFaq => Action::CompanyFaq,
            Intent::ConsumptionToday => Action::ConsumptionToday,
            Intent::ConsumptionYesterday => Action::ConsumptionYesterday,
            Intent::LatestVoltage => Action::LatestVoltage,
            Intent::LatestPower => Action::LatestPower,
            Intent::DailyChart => Action::DailyChart,
            Intent::WeeklyChart => Action::WeeklyChart,
            Intent::Unknown => Action::Help,
        }
    }
}

/// Where a routing decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    Command(Command),
    Classifier(Intent),
    /// The classifier failed; the decision is the safe default.
    ClassifierError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingDecision {
    pub action: Action,
    pub source: RouteSource,
}

/// Stateless router over the command table and an [`IntentClassifier`].
#[derive(Clone)]
pub struct IntentRouter {
    classifier: Arc<dyn IntentClassifier>,
}

impl IntentRouter {
    pub fn new(classifier: Arc<dyn IntentClassifier>) -> Self {
        Self { classifier }
    }

    /// Routes a message. Never fails: classifier errors become [`Action::Help`].
    pub async fn route(&self, text: &str) -> RoutingDecision {
        if let Some(command) = parse_command(text) {
            let action = Action::from(command);
            info!(%command, %action, "routed by command");
            return RoutingDecision {
                action,
                source: RouteSource::Command(command),
            };
        }

        match self.classifier.classify(text).await {
            Ok(intent) => {
                let action = Action::from(intent);
                info!(intent = intent.label(), %action, "routed by classifier");
                RoutingDecision {
                    action,
                    source: RouteSource::Classifier(intent),
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    classifier = self.classifier.name(),
                    "classifier failed, falling back to help"
                );
                RoutingDecision {
                    action: Action::Help,
                    source: RouteSource::ClassifierError,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meterwise_core::{AdapterType, HealthStatus, MeterwiseError, PluginAdapter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strum::IntoEnumIterator;

    struct Scripted {
        reply: Result<Intent, ()>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(reply: Result<Intent, ()>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PluginAdapter for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Classifier
        }
        async fn health_check(&self) -> Result<HealthStatus, MeterwiseError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), MeterwiseError> {
            Ok(())
        }
    }

    #[async_trait]
    impl IntentClassifier for Scripted {
        async fn classify(&self, _text: &str) -> Result<Intent, MeterwiseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .map_err(|()| MeterwiseError::classifier("service unavailable"))
        }
    }

    #[tokio::test]
    async fn command_skips_classifier() {
        let classifier = Scripted::new(Ok(Intent::HumanSupport));
        let router = IntentRouter::new(classifier.clone());
        let decision = router.route("/watts").await;
        assert_eq!(decision.action, Action::LatestPower);
        assert_eq!(decision.source, RouteSource::Command(Command::Power));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn free_text_goes_to_classifier() {
        let router = IntentRouter::new(Scripted::new(Ok(Intent::BillProjection)));
        let decision = router.route("cuanto voy a pagar de luz?").await;
        assert_eq!(decision.action, Action::BillProjection);
        assert_eq!(
            decision.source,
            RouteSource::Classifier(Intent::BillProjection)
        );
    }

    #[tokio::test]
    async fn human_support_escalates() {
        let router = IntentRouter::new(Scripted::new(Ok(Intent::HumanSupport)));
        assert_eq!(router.route("quiero un humano").await.action, Action::Escalate);
    }

    #[tokio::test]
    async fn unknown_intent_shows_help() {
        let router = IntentRouter::new(Scripted::new(Ok(Intent::Unknown)));
        assert_eq!(router.route("hola").await.action, Action::Help);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn classifier_error_degrades_to_help() {
        let router = IntentRouter::new(Scripted::new(Err(())));
        let decision = router.route("algo raro").await;
        assert_eq!(decision.action, Action::Help);
        assert_eq!(decision.source, RouteSource::ClassifierError);
        assert!(logs_contain("classifier failed"));
    }

    #[test]
    fn only_unknown_maps_to_help() {
        for intent in Intent::iter() {
            let is_help = Action::from(intent) == Action::Help;
            assert_eq!(is_help, intent == Intent::Unknown, "{intent}");
        }
    }

    #[test]
    fn channel_preference_commands() {
        assert_eq!(
            Action::from(Command::UseWhatsapp),
            Action::SetChannelPreference {
                prefers_telegram: false
            }
        );
    }
}
