// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use meterwise_config::model::MailerConfig;
use meterwise_core::{LinkCodeEmail, LinkCodeMailer, MeterwiseError};
use meterwise_mailer::ResendMailer;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mailer(server: &MockServer) -> ResendMailer {
    ResendMailer::new(&MailerConfig {
        api_key: Some("re_test".into()),
        from: "Cuentatrón <codes@example.com>".into(),
        endpoint: server.uri(),
    })
    .unwrap()
}

fn email() -> LinkCodeEmail {
    LinkCodeEmail {
        to: "ana@example.com".into(),
        name: "Ana".into(),
        code: "123456".into(),
        ttl_minutes: 10,
    }
}

#[tokio::test]
async fn posts_email_with_code_in_subject() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test"))
        .and(body_partial_json(json!({
            "from": "Cuentatrón <codes@example.com>",
            "to": ["ana@example.com"],
            "subject": "Tu código de Cuentatrón: 123456"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "em_1" })))
        .expect(1)
        .mount(&server)
        .await;

    mailer(&server).send_link_code(&email()).await.unwrap();
}

#[tokio::test]
async fn rejected_request_is_a_mailer_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
        .mount(&server)
        .await;

    let err = mailer(&server).send_link_code(&email()).await.unwrap_err();
    assert!(matches!(err, MeterwiseError::Mailer { .. }));
    assert!(err.to_string().contains("422"));
}
