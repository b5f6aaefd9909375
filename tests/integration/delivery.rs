//! Alert delivery through the real chat backend against a mock Bot API

use std::sync::Arc;

use assert_matches::assert_matches;
use radio_watchdog::{
    ChannelRole,
    config::TelegramConfig,
    error::DeliveryError,
    event_log::LogEvent,
    telegram::TelegramNotifier,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

fn telegram(server: &MockServer) -> Arc<TelegramNotifier> {
    Arc::new(TelegramNotifier::new(TelegramConfig {
        bot_token: "123:abc".to_string(),
        chat_id: "-100200".to_string(),
        api_url: server.uri(),
        timeout_secs: 5,
    }))
}

#[tokio::test]
async fn test_failed_email_still_posts_one_chat_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_string_contains("chat_id=-100200"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::with_email(
        dir.path(),
        at(12, 15, 0),
        FakeProbe::new([(ChannelRole::Primary, unreachable())]),
        RecordingNotifier::failing(),
    )
    .with_chat(telegram(&server));

    let report = harness.cycle(channels(false), options()).run().await;

    let alert = report.alert.unwrap();
    assert_matches!(alert.email, Some(Err(_)));
    assert!(alert.chat.is_ok());
    assert!(harness.log_text().contains("📲 Alerta enviada a Telegram"));

    server.verify().await;
}

#[tokio::test]
async fn test_rejected_chat_message_is_not_an_outage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string(r#"{"ok":false,"description":"Forbidden: bot was kicked"}"#),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(
        dir.path(),
        at(12, 16, 0),
        FakeProbe::new([(ChannelRole::Primary, sampled(4.0))]),
    )
    .with_chat(telegram(&server));

    let report = harness.cycle(channels(false), options()).run().await;

    assert_matches!(
        report.alert.unwrap().chat,
        Err(DeliveryError::Rejected { status: 403, ref body }) if body == "Forbidden: bot was kicked"
    );

    let text = harness.log_text();
    let failure = text
        .lines()
        .find(|line| line.contains("🚫 Error al enviar Telegram"))
        .unwrap();
    let event = LogEvent::parse(failure).unwrap();
    assert_eq!(event.status, None);

    // only the silent check itself counts against the primary stream
    let outages = text
        .lines()
        .filter_map(LogEvent::parse)
        .filter(|event| event.status.is_some_and(|status| status.is_outage()))
        .count();
    assert_eq!(outages, 1);
}
