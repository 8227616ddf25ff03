// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end scenarios.
//!
//! `TestHarness` assembles the full assistant over a temporary SQLite
//! subscriber store and mock collaborators, with a manual clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use meterwise_agent::{Assistant, Collaborators};
use meterwise_config::model::{MeterwiseConfig, StorageConfig};
use meterwise_core::{
    BillingParity, ChannelIdentity, Device, Intent, MeterwiseError, Subscriber, SubscriberStore,
    TicketingEvent, VoltageState,
};
use meterwise_storage::SqliteSubscriberStore;
use meterwise_storage::queries::{devices, subscribers};

use crate::clock::ManualClock;
use crate::mock_channel::MockSender;
use crate::mock_services::{MockClassifier, MockMailer, MockTicketing, MockTimeSeries};

/// A subscriber with neutral defaults, bound to nothing.
pub fn sample_subscriber(id: &str, email: &str) -> Subscriber {
    Subscriber {
        id: id.to_string(),
        name: "Ana".into(),
        email: email.to_string(),
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

pub struct TestHarnessBuilder {
    now: DateTime<Utc>,
    config: MeterwiseConfig,
    subscribers: Vec<Subscriber>,
    devices: Vec<Device>,
    intent: Intent,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            now: Utc::now(),
            config: MeterwiseConfig::default(),
            subscribers: Vec::new(),
            devices: Vec::new(),
            intent: Intent::Unknown,
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn with_config(mut self, config: MeterwiseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_subscriber(mut self, subscriber: Subscriber) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Adds an active device owned by `subscriber_id`.
    pub fn with_device(mut self, id: &str, subscriber_id: &str) -> Self {
        self.devices.push(Device {
            id: id.to_string(),
            subscriber_id: subscriber_id.to_string(),
            active: true,
        });
        self
    }

    /// Intent the mock classifier returns.
    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = intent;
        self
    }

    pub async fn build(self) -> Result<TestHarness, MeterwiseError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| MeterwiseError::Storage { source: e.into() })?;
        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: temp_dir
                .path()
                .join("test.db")
                .to_string_lossy()
                .into_owned(),
            wal_mode: true,
        };

        let store = Arc::new(SqliteSubscriberStore::new(config.storage.clone()));
        store.initialize().await?;
        let db = store.database()?;
        for subscriber in &self.subscribers {
            subscribers::insert_subscriber(db, subscriber).await?;
        }
        for device in &self.devices {
            devices::insert_device(db, device).await?;
        }

        let clock = Arc::new(ManualClock::new(self.now));
        let sender = Arc::new(MockSender::new());
        let timeseries = Arc::new(MockTimeSeries::new());
        let classifier = Arc::new(MockClassifier::new(self.intent));
        let ticketing = Arc::new(MockTicketing::new());
        let mailer = Arc::new(MockMailer::new());

        let assistant = Assistant::new(
            &config,
            Collaborators {
                store: store.clone(),
                timeseries: timeseries.clone(),
                classifier: classifier.clone(),
                faq: classifier.clone(),
                sender: sender.clone(),
                ticketing: ticketing.clone(),
                mailer: mailer.clone(),
                clock: clock.clone(),
            },
        )?;

        Ok(TestHarness {
            assistant: Arc::new(assistant),
            store,
            clock,
            sender,
            timeseries,
            classifier,
            ticketing,
            mailer,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A running assistant with handles on every mock for assertions.
pub struct TestHarness {
    pub assistant: Arc<Assistant>,
    pub store: Arc<SqliteSubscriberStore>,
    pub clock: Arc<ManualClock>,
    pub sender: Arc<MockSender>,
    pub timeseries: Arc<MockTimeSeries>,
    pub classifier: Arc<MockClassifier>,
    pub ticketing: Arc<MockTicketing>,
    pub mailer: Arc<MockMailer>,
    pub config: MeterwiseConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Delivers `text` from `identity` and returns the replies it produced.
    pub async fn send(&self, identity: &str, text: &str) -> Vec<String> {
        let identity = ChannelIdentity::from(identity);
        self.sender.take().await;
        self.assistant.handle_inbound_message(&identity, text).await;
        self.sender
            .take()
            .await
            .into_iter()
            .filter(|m| m.recipient == identity)
            .map(|m| m.text)
            .collect()
    }

    /// Applies a helpdesk event and returns the messages it produced.
    pub async fn ticketing_event(&self, event: TicketingEvent) -> Vec<(ChannelIdentity, String)> {
        self.sender.take().await;
        self.assistant.handle_ticketing_event(event).await;
        self.sender
            .take()
            .await
            .into_iter()
            .map(|m| (m.recipient, m.text))
            .collect()
    }

    /// Reloads a subscriber from the store.
    pub async fn subscriber(&self, id: &str) -> Subscriber {
        match self.store.get_subscriber(id).await {
            Ok(Some(subscriber)) => subscriber,
            other => panic!("subscriber {id} not loadable: {other:?}"),
        }
    }
}
