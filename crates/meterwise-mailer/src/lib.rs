// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Link-code delivery through the Resend HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use meterwise_config::model::MailerConfig;
use meterwise_core::{
    AdapterType, HealthStatus, LinkCodeEmail, LinkCodeMailer, MeterwiseError, PluginAdapter,
};
use serde_json::json;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends one-time link codes as transactional email.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: Option<String>,
    from: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(config: &MailerConfig) -> Result<Self, MeterwiseError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MeterwiseError::Mailer {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            from: config.from.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Subject line carrying the code.
pub fn subject(code: &str) -> String {
    format!("Tu código de Cuentatrón: {code}")
}

/// HTML body with the greeting, the TTL and the code.
pub fn html_body(email: &LinkCodeEmail) -> String {
    let name = if email.name.trim().is_empty() {
        "cliente".to_string()
    } else {
        escape_html(email.name.trim())
    };
    format!(
        "<h1>Tu código de un solo uso</h1>\
         <p>Hola {name},</p>\
         <p>Usa el siguiente código para vincular tu cuenta de Telegram. Este código expira en {} minutos.</p>\
         <h2 style=\"font-size: 32px; letter-spacing: 4px; text-align: center;\">{}</h2>",
        email.ttl_minutes, email.code
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
impl PluginAdapter for ResendMailer {
    fn name(&self) -> &str {
        "resend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Mailer
    }

    async fn health_check(&self) -> Result<HealthStatus, MeterwiseError> {
        Ok(if self.is_configured() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded("no mailer API key, link codes cannot be sent".into())
        })
    }

    async fn shutdown(&self) -> Result<(), MeterwiseError> {
        Ok(())
    }
}

#[async_trait]
impl LinkCodeMailer for ResendMailer {
    async fn send_link_code(&self, email: &LinkCodeEmail) -> Result<(), MeterwiseError> {
        let Some(api_key) = &self.api_key else {
            return Err(MeterwiseError::Mailer {
                message: "no mailer API key configured".into(),
                source: None,
            });
        };

        let body = json!({
            "from": self.from,
            "to": [email.to],
            "subject": subject(&email.code),
            "html": html_body(email),
        });

        let response = self
            .client
            .post(format!("{}/emails", self.endpoint))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MeterwiseError::Mailer {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MeterwiseError::Mailer {
                message: format!("Resend returned {status}: {text}"),
                source: None,
            });
        }

        let receipt: serde_json::Value = response.json().await.unwrap_or_default();
        debug!(email_id = ?receipt.get("id"), "link-code email accepted");
        info!(to = %email.to, "link-code email sent");
        Ok(())
    }
}
