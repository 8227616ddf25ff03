// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatwoot relay against a mock helpdesk.

use meterwise_config::model::TicketingConfig;
use meterwise_core::{
    BillingParity, ChannelIdentity, MeterwiseError, Subscriber, TicketingAdapter, VoltageState,
};
use meterwise_ticketing::ChatwootClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT: &str = "/api/v1/accounts/1";

fn subscriber() -> Subscriber {
    Subscriber {
        id: "sub-1".into(),
        name: "Ana".into(),
        email: "ana@example.com".into(),
        phone: Some("+525512345678".into()),
        cutoff_day: 15,
        parity: BillingParity::Even,
        service_start: None,
        tariff_code: "01".into(),
        initial_reading: None,
        prior_closing_reading: None,
        channel_identity: Some(ChannelIdentity::from("777")),
        prefers_telegram: false,
        escalation_until: None,
        link_code: None,
        link_code_expires_at: None,
        leak_active: false,
        voltage_state: VoltageState::Normal,
        next_payment_date: None,
    }
}

fn client(server: &MockServer) -> ChatwootClient {
    ChatwootClient::new(&TicketingConfig {
        url: Some(server.uri()),
        account_id: Some(1),
        api_token: Some("tok".into()),
        inbox_id: Some(3),
    })
    .unwrap()
}

async fn mount_contact_search(server: &MockServer, payload: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNT}/contacts/search")))
        .and(query_param("q", "ana@example.com"))
        .and(header("api_access_token", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "payload": payload })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_conversations(server: &MockServer, contact_id: u64, payload: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNT}/contacts/{contact_id}/conversations")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "payload": payload })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn appends_to_open_conversation_in_inbox() {
    let server = MockServer::start().await;
    mount_contact_search(&server, json!([{ "id": 10, "identifier": "777" }])).await;
    mount_conversations(
        &server,
        10,
        json!([
            { "id": 1, "inbox_id": 9, "status": "open" },
            { "id": 2, "inbox_id": 3, "status": "open" }
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNT}/conversations/2/messages")))
        .and(body_partial_json(
            json!({ "content": "no tengo luz", "message_type": "incoming" }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 99 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    client(&server).relay(&subscriber(), "no tengo luz").await.unwrap();
}

#[tokio::test]
async fn stale_identifier_is_updated() {
    let server = MockServer::start().await;
    mount_contact_search(&server, json!([{ "id": 10, "identifier": "111" }])).await;
    Mock::given(method("PATCH"))
        .and(path(format!("{ACCOUNT}/contacts/10")))
        .and(body_partial_json(json!({ "identifier": "777" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "payload": {} })))
        .expect(1)
        .mount(&server)
        .await;
    mount_conversations(&server, 10, json!([{ "id": 2, "inbox_id": 3, "status": "open" }]))
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNT}/conversations/2/messages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 99 })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).relay(&subscriber(), "hola").await.unwrap();
}

#[tokio::test]
async fn reopens_latest_resolved_conversation() {
    let server = MockServer::start().await;
    mount_contact_search(&server, json!([{ "id": 10, "identifier": "777" }])).await;
    mount_conversations(
        &server,
        10,
        json!([
            { "id": 4, "inbox_id": 3, "status": "resolved" },
            { "id": 8, "inbox_id": 3, "status": "resolved" }
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNT}/conversations/8/messages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 99 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNT}/conversations/8/toggle_status")))
        .and(body_partial_json(json!({ "status": "open" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "payload": {} })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).relay(&subscriber(), "otra vez").await.unwrap();
}

#[tokio::test]
async fn creates_contact_and_conversation_when_missing() {
    let server = MockServer::start().await;
    mount_contact_search(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNT}/contacts")))
        .and(body_partial_json(json!({
            "name": "Ana",
            "email": "ana@example.com",
            "identifier": "777"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "payload": { "contact": { "id": 55, "identifier": "777" } }
            })),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_conversations(&server, 55, json!([])).await;
    Mock::given(method("POST"))
        .and(path(format!("{ACCOUNT}/conversations")))
        .and(body_partial_json(json!({
            "inbox_id": 3,
            "contact_id": 55,
            "message": { "content": "ayuda", "message_type": "incoming" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 12 })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).relay(&subscriber(), "ayuda").await.unwrap();
}

#[tokio::test]
async fn helpdesk_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNT}/contacts/search")))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = client(&server).relay(&subscriber(), "hola").await.unwrap_err();
    assert!(matches!(err, MeterwiseError::Ticketing { .. }));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn unconfigured_client_skips_relay() {
    let client = ChatwootClient::new(&TicketingConfig::default()).unwrap();
    client.relay(&subscriber(), "hola").await.unwrap();
}
