//! Integration tests for `TelegramNotifier` using wiremock HTTP mocks.

use scriptspy_pipeline::{NotificationError, TelegramNotifier};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn sends_message_to_configured_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .and(body_json(serde_json::json!({"chat_id": "42", "text": "hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::with_base_url(
        Some("TOKEN".to_string()),
        Some("42".to_string()),
        5,
        &server.uri(),
    )
    .expect("notifier construction should not fail");

    assert!(notifier.is_enabled());
    notifier.notify("hello").await.expect("notify");
}

#[tokio::test]
async fn rejected_message_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("chat not found"))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::with_base_url(
        Some("TOKEN".to_string()),
        Some("42".to_string()),
        5,
        &server.uri(),
    )
    .expect("notifier construction should not fail");

    let err = notifier.notify("hello").await.unwrap_err();
    assert!(matches!(
        err,
        NotificationError::Rejected { status: 400, ref body } if body == "chat not found"
    ));
}

#[tokio::test]
async fn missing_credentials_is_a_silent_no_op() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for (token, chat) in [
        (None, None),
        (Some("TOKEN".to_string()), None),
        (None, Some("42".to_string())),
    ] {
        let notifier = TelegramNotifier::with_base_url(token, chat, 5, &server.uri())
            .expect("notifier construction should not fail");
        assert!(!notifier.is_enabled());
        notifier.notify("hello").await.expect("disabled notifier is Ok");
    }
}
