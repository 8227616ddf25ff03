// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `meterwise serve` command implementation.
//!
//! Opens the subscriber store, builds every collaborator from configuration,
//! and runs the webhook gateway (plus the Telegram poller in polling mode)
//! until SIGINT/SIGTERM.

use std::sync::Arc;

use meterwise_agent::{Assistant, Collaborators, install_signal_handler};
use meterwise_config::MeterwiseConfig;
use meterwise_config::model::TelegramMode;
use meterwise_core::{HealthStatus, MeterwiseError, PluginAdapter, SystemClock};
use meterwise_gateway::GatewayState;
use meterwise_mailer::ResendMailer;
use meterwise_metering::InfluxSource;
use meterwise_router::GeminiClient;
use meterwise_storage::SqliteSubscriberStore;
use meterwise_telegram::TelegramSender;
use meterwise_telegram::poller::run_polling;
use meterwise_ticketing::ChatwootClient;
use tracing::{error, info, warn};

pub async fn run_serve(config: MeterwiseConfig) -> Result<(), MeterwiseError> {
    info!(name = %config.service.name, "starting meterwise serve");

    let store = Arc::new(SqliteSubscriberStore::new(config.storage.clone()));
    store.initialize().await?;

    let timeseries = Arc::new(InfluxSource::new(&config.timeseries)?);
    let gemini = Arc::new(GeminiClient::new(&config.classifier)?);
    let sender = Arc::new(TelegramSender::new(&config.telegram)?);
    let ticketing = Arc::new(ChatwootClient::new(&config.ticketing)?);
    let mailer = Arc::new(ResendMailer::new(&config.mailer)?);

    let adapters: Vec<Arc<dyn PluginAdapter>> = vec![
        store.clone() as Arc<dyn PluginAdapter>,
        timeseries.clone() as Arc<dyn PluginAdapter>,
        gemini.clone() as Arc<dyn PluginAdapter>,
        sender.clone() as Arc<dyn PluginAdapter>,
        ticketing.clone() as Arc<dyn PluginAdapter>,
        mailer.clone() as Arc<dyn PluginAdapter>,
    ];
    report_health(&adapters).await;

    let assistant = Arc::new(Assistant::new(
        &config,
        Collaborators {
            store: store.clone(),
            timeseries,
            classifier: gemini.clone(),
            faq: gemini,
            sender: sender.clone(),
            ticketing,
            mailer,
            clock: Arc::new(SystemClock),
        },
    )?);

    let cancel = install_signal_handler();

    let poller = match (config.telegram.mode, sender.bot()) {
        (TelegramMode::Polling, Some(bot)) => Some(tokio::spawn(run_polling(
            bot.clone(),
            Arc::clone(&assistant),
            cancel.clone(),
        ))),
        (TelegramMode::Polling, None) => {
            warn!("telegram.mode is polling but no bot token is set, poller not started");
            None
        }
        (TelegramMode::Webhook, _) => None,
    };

    let state = GatewayState::new(Arc::clone(&assistant), store.clone());
    let served = meterwise_gateway::serve(&config.gateway, state, cancel.clone()).await;
    if served.is_err() {
        // Stop the poller too when the gateway could not run.
        cancel.cancel();
    }

    if let Some(poller) = poller {
        if let Err(e) = poller.await {
            error!(error = %e, "Telegram poller task failed");
        }
    }

    for adapter in &adapters {
        if let Err(e) = adapter.shutdown().await {
            warn!(adapter = adapter.name(), error = %e, "adapter shutdown failed");
        }
    }

    info!("meterwise stopped");
    served
}

async fn report_health(adapters: &[Arc<dyn PluginAdapter>]) {
    for adapter in adapters {
        match adapter.health_check().await {
            Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "collaborator healthy"),
            Ok(HealthStatus::Degraded(reason)) => {
                warn!(adapter = adapter.name(), reason = %reason, "collaborator degraded")
            }
            Ok(HealthStatus::Unhealthy(reason)) => {
                warn!(adapter = adapter.name(), reason = %reason, "collaborator unhealthy")
            }
            Err(e) => {
                warn!(adapter = adapter.name(), error = %e, "collaborator health check failed")
            }
        }
    }
}
