// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the SubscriberStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use meterwise_config::model::StorageConfig;
use meterwise_core::{
    AdapterType, ChannelIdentity, Device, HealthStatus, MeterwiseError, PluginAdapter, Subscriber,
    SubscriberStore,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed subscriber store.
///
/// The database is opened by [`SqliteSubscriberStore::initialize`]; every
/// trait call before that fails with a storage error.
pub struct SqliteSubscriberStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteSubscriberStore {
    /// The connection is not opened until [`initialize`](Self::initialize).
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Opens the database and applies migrations.
    pub async fn initialize(&self) -> Result<(), MeterwiseError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| MeterwiseError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "subscriber store initialized");
        Ok(())
    }

    /// The underlying database, for operator tooling and seeding.
    pub fn database(&self) -> Result<&Database, MeterwiseError> {
        self.db.get().ok_or_else(|| MeterwiseError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(db: &Database) -> Result<(), MeterwiseError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteSubscriberStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MeterwiseError> {
        let db = self.database()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MeterwiseError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriberStore for SqliteSubscriberStore {
    async fn get_subscriber(&self, id: &str) -> Result<Option<Subscriber>, MeterwiseError> {
        queries::subscribers::get_subscriber(self.database()?, id).await
    }

    async fn find_by_channel(
        &self,
        identity: &ChannelIdentity,
    ) -> Result<Option<Subscriber>, MeterwiseError> {
        queries::subscribers::find_by_channel(self.database()?, identity).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, MeterwiseError> {
        queries::subscribers::find_by_email(self.database()?, email).await
    }

    async fn primary_device(&self, subscriber_id: &str) -> Result<Option<Device>, MeterwiseError> {
        queries::devices::primary_device(self.database()?, subscriber_id).await
    }

    async fn set_link_code(
        &self,
        subscriber_id: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), MeterwiseError> {
        queries::subscribers::set_link_code(self.database()?, subscriber_id, code, expires_at).await
    }

    async fn consume_link_code(
        &self,
        code: &str,
        identity: &ChannelIdentity,
        now: DateTime<Utc>,
    ) -> Result<Option<Subscriber>, MeterwiseError> {
        queries::subscribers::consume_link_code(self.database()?, code, identity, now).await
    }

    async fn set_escalation(
        &self,
        subscriber_id: &str,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), MeterwiseError> {
        queries::subscribers::set_escalation(self.database()?, subscriber_id, until).await
    }

    async fn set_channel_preference(
        &self,
        subscriber_id: &str,
        prefers_telegram: bool,
    ) -> Result<(), MeterwiseError> {
        queries::subscribers::set_channel_preference(
            self.database()?,
            subscriber_id,
            prefers_telegram,
        )
        .await
    }
}
