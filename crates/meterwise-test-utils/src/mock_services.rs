// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock time-series, classifier, ticketing and mailer collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use meterwise_core::{
    AdapterType, FaqResponder, HealthStatus, Intent, IntentClassifier, LinkCodeEmail,
    LinkCodeMailer, MeasurementField, MeterwiseError, PluginAdapter, Sample, Subscriber,
    TicketingAdapter, TimeRange, TimeSeriesSource,
};

macro_rules! mock_adapter {
    ($ty:ty, $name:literal, $kind:expr) => {
        #[async_trait]
        impl PluginAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                $kind
            }

            async fn health_check(&self) -> Result<HealthStatus, MeterwiseError> {
                Ok(HealthStatus::Healthy)
            }

            async fn shutdown(&self) -> Result<(), MeterwiseError> {
                Ok(())
            }
        }
    };
}

/// Time-series source backed by a constant power draw and canned samples.
///
/// `power_integral` returns `watts * seconds` for any range, or `None` when
/// no constant load is set.
#[derive(Default)]
pub struct MockTimeSeries {
    constant_watts: Mutex<Option<f64>>,
    last: Mutex<HashMap<MeasurementField, Sample>>,
    hourly: Mutex<Vec<Sample>>,
    integral_ranges: Mutex<Vec<TimeRange>>,
    failing: AtomicBool,
}

impl MockTimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_constant_power(&self, watts: Option<f64>) {
        *self.constant_watts.lock().await = watts;
    }

    pub async fn set_last(&self, field: MeasurementField, sample: Sample) {
        self.last.lock().await.insert(field, sample);
    }

    /// Hourly means returned for any field, filtered to the queried range.
    pub async fn set_hourly(&self, samples: Vec<Sample>) {
        *self.hourly.lock().await = samples;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn integral_ranges(&self) -> Vec<TimeRange> {
        self.integral_ranges.lock().await.clone()
    }

    fn check(&self) -> Result<(), MeterwiseError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MeterwiseError::time_series("mock time-series failure"));
        }
        Ok(())
    }
}

mock_adapter!(MockTimeSeries, "mock-timeseries", AdapterType::TimeSeries);

#[async_trait]
impl TimeSeriesSource for MockTimeSeries {
    async fn last_sample(
        &self,
        _device_id: &str,
        field: MeasurementField,
    ) -> Result<Option<Sample>, MeterwiseError> {
        self.check()?;
        Ok(self.last.lock().await.get(&field).copied())
    }

    async fn power_integral(
        &self,
        _device_id: &str,
        range: TimeRange,
    ) -> Result<Option<f64>, MeterwiseError> {
        self.check()?;
        self.integral_ranges.lock().await.push(range);
        let seconds = (range.stop - range.start).num_seconds() as f64;
        Ok(self.constant_watts.lock().await.map(|w| w * seconds))
    }

    async fn hourly_means(
        &self,
        _device_id: &str,
        _field: MeasurementField,
        range: TimeRange,
    ) -> Result<Vec<Sample>, MeterwiseError> {
        self.check()?;
        Ok(self
            .hourly
            .lock()
            .await
            .iter()
            .filter(|s| s.time >= range.start && s.time < range.stop)
            .copied()
            .collect())
    }
}

/// Scripted classifier: returns the configured intent (or error) and a
/// fixed FAQ answer. Counts classification calls.
pub struct MockClassifier {
    reply: Mutex<Result<Intent, String>>,
    faq_answer: Mutex<String>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn new(intent: Intent) -> Self {
        Self {
            reply: Mutex::new(Ok(intent)),
            faq_answer: Mutex::new("Solo monitoreamos tu consumo.".into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_intent(&self, intent: Intent) {
        *self.reply.lock().await = Ok(intent);
    }

    pub async fn set_error(&self, message: &str) {
        *self.reply.lock().await = Err(message.to_string());
    }

    pub async fn set_faq_answer(&self, answer: &str) {
        *self.faq_answer.lock().await = answer.to_string();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new(Intent::Unknown)
    }
}

mock_adapter!(MockClassifier, "mock-classifier", AdapterType::Classifier);

#[async_trait]
impl IntentClassifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<Intent, MeterwiseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .lock()
            .await
            .clone()
            .map_err(MeterwiseError::classifier)
    }
}

#[async_trait]
impl FaqResponder for MockClassifier {
    async fn answer(&self, _question: &str) -> Result<String, MeterwiseError> {
        Ok(self.faq_answer.lock().await.clone())
    }
}

/// Records every relayed message as `(subscriber_id, text)`.
#[derive(Default)]
pub struct MockTicketing {
    relayed: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl MockTicketing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn relayed(&self) -> Vec<(String, String)> {
        self.relayed.lock().await.clone()
    }
}

mock_adapter!(MockTicketing, "mock-ticketing", AdapterType::Ticketing);

#[async_trait]
impl TicketingAdapter for MockTicketing {
    async fn relay(&self, subscriber: &Subscriber, text: &str) -> Result<(), MeterwiseError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MeterwiseError::ticketing("mock helpdesk unavailable"));
        }
        self.relayed
            .lock()
            .await
            .push((subscriber.id.clone(), text.to_string()));
        Ok(())
    }
}

/// Captures link-code emails instead of sending them.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<LinkCodeEmail>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<LinkCodeEmail> {
        self.sent.lock().await.clone()
    }

    /// The code in the most recent email.
    pub async fn last_code(&self) -> Option<String> {
        self.sent.lock().await.last().map(|e| e.code.clone())
    }
}

mock_adapter!(MockMailer, "mock-mailer", AdapterType::Mailer);

#[async_trait]
impl LinkCodeMailer for MockMailer {
    async fn send_link_code(&self, email: &LinkCodeEmail) -> Result<(), MeterwiseError> {
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}
