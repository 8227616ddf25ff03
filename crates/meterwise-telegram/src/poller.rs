// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-polling inbound loop, used when no public webhook URL exists.

use std::sync::Arc;

use meterwise_agent::Assistant;
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::handler;

/// Polls the Bot API and feeds text messages to the assistant until
/// `cancel` fires.
pub async fn run_polling(bot: Bot, assistant: Arc<Assistant>, cancel: CancellationToken) {
    let handler = Update::filter_message().endpoint(move |msg: Message| {
        let assistant = Arc::clone(&assistant);
        async move {
            match handler::from_message(&msg) {
                Some(inbound) => {
                    assistant
                        .handle_inbound_message(&inbound.identity, &inbound.text)
                        .await;
                }
                None => debug!(msg_id = msg.id.0, "ignoring non-text message"),
            }
            respond(())
        }
    });

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .default_handler(|_| async {})
        .build();

    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        cancel.cancelled().await;
        if let Ok(done) = shutdown.shutdown() {
            done.await;
        }
    });

    info!("starting Telegram long polling");
    dispatcher.dispatch().await;
    info!("Telegram long polling stopped");
}
