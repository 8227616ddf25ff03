// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatwoot application API client.

use std::time::Duration;

use async_trait::async_trait;
use meterwise_config::model::TicketingConfig;
use meterwise_core::{
    AdapterType, HealthStatus, MeterwiseError, PluginAdapter, Subscriber, TicketingAdapter,
};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct Account {
    base_url: String,
    account_id: u64,
    api_token: String,
    inbox_id: u64,
}

#[derive(Debug, Deserialize)]
struct ContactSearch {
    #[serde(default)]
    payload: Vec<ContactRecord>,
}

#[derive(Debug, Deserialize)]
struct ContactRecord {
    id: u64,
    identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContactCreated {
    payload: ContactCreatedPayload,
}

#[derive(Debug, Deserialize)]
struct ContactCreatedPayload {
    contact: ContactRecord,
}

#[derive(Debug, Deserialize)]
struct ConversationList {
    #[serde(default)]
    payload: Vec<ConversationRecord>,
}

#[derive(Debug, Deserialize)]
struct ConversationRecord {
    id: u64,
    inbox_id: u64,
    status: String,
}

/// Relays escalated messages into a Chatwoot inbox.
///
/// Without a complete configuration the client stays inert: relays are
/// skipped with a warning and health reports degraded.
#[derive(Debug, Clone)]
pub struct ChatwootClient {
    client: reqwest::Client,
    account: Option<Account>,
}

impl ChatwootClient {
    pub fn new(config: &TicketingConfig) -> Result<Self, MeterwiseError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MeterwiseError::Ticketing {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let account = match (
            config.url.as_deref(),
            config.account_id,
            config.api_token.as_deref(),
            config.inbox_id,
        ) {
            (Some(url), Some(account_id), Some(api_token), Some(inbox_id)) => Some(Account {
                base_url: url.trim_end_matches('/').to_string(),
                account_id,
                api_token: api_token.to_string(),
                inbox_id,
            }),
            _ => {
                warn!(
                    "ticketing not fully configured, escalated messages will not reach the helpdesk"
                );
                None
            }
        };

        Ok(Self { client, account })
    }

    pub fn is_configured(&self) -> bool {
        self.account.is_some()
    }

    async fn call<T: DeserializeOwned>(
        &self,
        account: &Account,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<T, MeterwiseError> {
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header("api_access_token", &account.api_token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| MeterwiseError::Ticketing {
            message: format!("{method} {} failed: {e}", url.path()),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MeterwiseError::ticketing(format!(
                "{method} {} returned {status}: {text}",
                url.path()
            )));
        }

        response.json::<T>().await.map_err(|e| MeterwiseError::Ticketing {
            message: format!("unexpected response from {}: {e}", url.path()),
            source: Some(Box::new(e)),
        })
    }

    fn url(&self, account: &Account, path: &str) -> Result<Url, MeterwiseError> {
        let raw = format!(
            "{}/api/v1/accounts/{}/{path}",
            account.base_url, account.account_id
        );
        Url::parse(&raw).map_err(|e| MeterwiseError::Ticketing {
            message: format!("invalid helpdesk URL {raw}: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Finds the contact by email, syncing its identifier, or creates it.
    async fn ensure_contact(
        &self,
        account: &Account,
        subscriber: &Subscriber,
    ) -> Result<u64, MeterwiseError> {
        let identity = subscriber.channel_identity.as_ref().map(|c| c.0.clone());
        let search_url = Url::parse_with_params(
            self.url(account, "contacts/search")?.as_str(),
            &[("q", subscriber.email.as_str())],
        )
        .map_err(|e| MeterwiseError::Ticketing {
            message: format!("invalid contact search URL: {e}"),
            source: Some(Box::new(e)),
        })?;
        let found: ContactSearch = self.call(account, Method::GET, search_url, None).await?;

        if let Some(contact) = found.payload.into_iter().next() {
            if identity.is_some() && contact.identifier != identity {
                info!(
                    contact_id = contact.id,
                    old = ?contact.identifier,
                    new = ?identity,
                    "updating stale helpdesk contact identifier"
                );
                let url = self.url(account, &format!("contacts/{}", contact.id))?;
                let _: Value = self
                    .call(
                        account,
                        Method::PATCH,
                        url,
                        Some(json!({ "identifier": identity })),
                    )
                    .await?;
            }
            return Ok(contact.id);
        }

        let created: ContactCreated = self
            .call(
                account,
                Method::POST,
                self.url(account, "contacts")?,
                Some(json!({
                    "name": subscriber.name,
                    "email": subscriber.email,
                    "phone_number": subscriber.phone,
                    "identifier": identity,
                })),
            )
            .await?;
        info!(
            contact_id = created.payload.contact.id,
            subscriber_id = %subscriber.id,
            "helpdesk contact created"
        );
        Ok(created.payload.contact.id)
    }

    async fn post_message(
        &self,
        account: &Account,
        conversation_id: u64,
        text: &str,
    ) -> Result<(), MeterwiseError> {
        let url = self.url(account, &format!("conversations/{conversation_id}/messages"))?;
        let _: Value = self
            .call(
                account,
                Method::POST,
                url,
                Some(json!({ "content": text, "message_type": "incoming" })),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for ChatwootClient {
    fn name(&self) -> &str {
        "chatwoot"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Ticketing
    }

    async fn health_check(&self) -> Result<HealthStatus, MeterwiseError> {
        Ok(if self.is_configured() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded("helpdesk not configured".into())
        })
    }

    async fn shutdown(&self) -> Result<(), MeterwiseError> {
        Ok(())
    }
}

#[async_trait]
impl TicketingAdapter for ChatwootClient {
    /// Appends `text` to the subscriber's conversation in the configured
    /// inbox: the open one, else the most recent resolved one (reopened),
    /// else a new conversation.
    async fn relay(&self, subscriber: &Subscriber, text: &str) -> Result<(), MeterwiseError> {
        let Some(account) = &self.account else {
            warn!(subscriber_id = %subscriber.id, "helpdesk relay skipped, not configured");
            return Ok(());
        };
        if subscriber.email.trim().is_empty() {
            return Err(MeterwiseError::ticketing(format!(
                "subscriber {} has no email for the helpdesk contact",
                subscriber.id
            )));
        }

        let contact_id = self.ensure_contact(account, subscriber).await?;
        let url = self.url(account, &format!("contacts/{contact_id}/conversations"))?;
        let conversations: ConversationList = self.call(account, Method::GET, url, None).await?;
        let in_inbox: Vec<&ConversationRecord> = conversations
            .payload
            .iter()
            .filter(|c| c.inbox_id == account.inbox_id)
            .collect();

        if let Some(open) = in_inbox.iter().find(|c| c.status == "open") {
            self.post_message(account, open.id, text).await?;
            debug!(conversation_id = open.id, "message appended to open conversation");
            return Ok(());
        }

        if let Some(resolved) = in_inbox
            .iter()
            .filter(|c| c.status == "resolved")
            .max_by_key(|c| c.id)
        {
            self.post_message(account, resolved.id, text).await?;
            let url = self.url(account, &format!("conversations/{}/toggle_status", resolved.id))?;
            let _: Value = self
                .call(account, Method::POST, url, Some(json!({ "status": "open" })))
                .await?;
            info!(conversation_id = resolved.id, "resolved conversation reopened");
            return Ok(());
        }

        let created: Value = self
            .call(
                account,
                Method::POST,
                self.url(account, "conversations")?,
                Some(json!({
                    "inbox_id": account.inbox_id,
                    "contact_id": contact_id,
                    "status": "open",
                    "message": { "content": text, "message_type": "incoming" },
                })),
            )
            .await?;
        info!(
            conversation_id = ?created.get("id"),
            subscriber_id = %subscriber.id,
            "helpdesk conversation created"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn partial_config_is_inert() {
        let client = ChatwootClient::new(&TicketingConfig {
            url: Some("https://helpdesk.example.com".into()),
            account_id: Some(1),
            api_token: None,
            inbox_id: Some(3),
        })
        .unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }

    #[test]
    fn urls_are_scoped_to_the_account() {
        let client = ChatwootClient::new(&TicketingConfig {
            url: Some("https://helpdesk.example.com/".into()),
            account_id: Some(42),
            api_token: Some("tok".into()),
            inbox_id: Some(3),
        })
        .unwrap();
        let account = client.account.clone().unwrap();
        assert_eq!(
            client.url(&account, "contacts").unwrap().as_str(),
            "https://helpdesk.example.com/api/v1/accounts/42/contacts"
        );
    }
}
