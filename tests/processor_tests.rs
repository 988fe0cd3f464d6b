use std::time::Duration;

use notification_relay::{
    clients::webhook::WebhookClient,
    config::Config,
    error::RelayError,
    models::outcome::{AckDecision, ProcessingOutcome},
    utils::process_message,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

use crate::common::{self, CREATE_END};

fn relay_to(server: &MockServer, extra: &[(&str, &str)]) -> (Config, WebhookClient) {
    let url = format!("{}/hook", server.uri());
    let mut pairs = vec![("WEBHOOK_URL", url.as_str())];
    pairs.extend_from_slice(extra);

    let config = common::config(&pairs);
    let webhook = WebhookClient::from_config(&config).expect("webhook client");

    (config, webhook)
}

/// Test: Well-formed notification is forwarded verbatim and acknowledged
#[tokio::test]
async fn test_forwards_full_notification_and_acknowledges() {
    let server = MockServer::start().await;
    let notification = common::instance_created();

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_json(&notification))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(&server, &[]);

    let outcome = process_message(notification.to_string().as_bytes(), &config, &webhook).await;

    assert!(matches!(outcome, ProcessingOutcome::Forwarded));
    assert_eq!(outcome.ack_decision(), AckDecision::Ack);
}

/// Test: Double-encoded envelope is forwarded as the original outer object
#[tokio::test]
async fn test_forwards_outer_object_for_string_envelope() {
    let server = MockServer::start().await;
    let notification = common::instance_created_encoded();

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_json(&notification))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(&server, &[]);

    let outcome = process_message(notification.to_string().as_bytes(), &config, &webhook).await;

    assert!(matches!(outcome, ProcessingOutcome::Forwarded));
}

/// Test: Ignored event types are acknowledged without calling the webhook
#[tokio::test]
async fn test_ignored_event_type_is_acknowledged_without_delivery() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(&server, &[("IGNORED_EVENT_TYPES", CREATE_END)]);
    let payload = common::instance_created().to_string();

    let outcome = process_message(payload.as_bytes(), &config, &webhook).await;

    match &outcome {
        ProcessingOutcome::Ignored { event_type } => assert_eq!(event_type, CREATE_END),
        other => panic!("expected ignored outcome, got {:?}", other),
    }
    assert_eq!(outcome.ack_decision(), AckDecision::Ack);
}

/// Test: Ignore list also applies to string-encoded envelopes
#[tokio::test]
async fn test_ignore_list_matches_string_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(
        &server,
        &[("IGNORED_EVENT_TYPES", "compute.instance.exists, compute.instance.create.end")],
    );
    let payload = common::instance_created_encoded().to_string();

    let outcome = process_message(payload.as_bytes(), &config, &webhook).await;

    assert!(matches!(outcome, ProcessingOutcome::Ignored { .. }));
}

/// Test: Invalid JSON is rejected without requeue and never delivered
#[tokio::test]
async fn test_invalid_json_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(&server, &[]);

    let outcome = process_message(b"not valid json", &config, &webhook).await;

    assert!(matches!(outcome, ProcessingOutcome::Failed(RelayError::Decode(_))));
    assert_eq!(outcome.ack_decision(), AckDecision::Reject { requeue: false });
}

/// Test: Non-2xx webhook response rejects the message
#[tokio::test]
async fn test_webhook_server_error_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(&server, &[]);
    let payload = common::instance_created().to_string();

    let outcome = process_message(payload.as_bytes(), &config, &webhook).await;

    match &outcome {
        ProcessingOutcome::Failed(RelayError::DeliveryStatus { status, body }) => {
            assert_eq!(*status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected delivery failure, got {:?}", other),
    }
    assert_eq!(outcome.ack_decision(), AckDecision::Reject { requeue: false });
}

/// Test: Client errors are treated the same as server errors
#[tokio::test]
async fn test_webhook_client_error_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(&server, &[]);
    let payload = common::instance_created().to_string();

    let outcome = process_message(payload.as_bytes(), &config, &webhook).await;

    assert!(matches!(
        outcome,
        ProcessingOutcome::Failed(RelayError::DeliveryStatus { status: 404, .. })
    ));
}

/// Test: Slow webhook hits the request timeout and is rejected
#[tokio::test]
async fn test_webhook_timeout_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(&server, &[("WEBHOOK_TIMEOUT_SECONDS", "1")]);
    let payload = common::instance_created().to_string();

    let outcome = process_message(payload.as_bytes(), &config, &webhook).await;

    assert!(matches!(
        outcome,
        ProcessingOutcome::Failed(RelayError::DeliveryTransport(_))
    ));
    assert_eq!(outcome.ack_decision(), AckDecision::Reject { requeue: false });
}

/// Test: Unreachable webhook is a delivery failure, not a crash
#[tokio::test]
async fn test_unreachable_webhook_is_rejected() {
    // Reserve a port, then close it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}/hook", listener.local_addr().expect("local addr"));
    drop(listener);

    let config = common::config(&[("WEBHOOK_URL", url.as_str())]);
    let webhook = WebhookClient::from_config(&config).expect("webhook client");
    let payload = common::instance_created().to_string();

    let outcome = process_message(payload.as_bytes(), &config, &webhook).await;

    assert!(matches!(
        outcome,
        ProcessingOutcome::Failed(RelayError::DeliveryTransport(_))
    ));
}

/// Test: Malformed inner envelope still forwards the message
#[tokio::test]
async fn test_malformed_envelope_string_is_still_forwarded() {
    let server = MockServer::start().await;
    let notification = json!({"oslo.version": "2.0", "oslo.message": "{\"event_type\": "});

    Mock::given(method("POST"))
        .and(body_json(&notification))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(&server, &[("IGNORED_EVENT_TYPES", CREATE_END)]);

    let outcome = process_message(notification.to_string().as_bytes(), &config, &webhook).await;

    assert!(matches!(outcome, ProcessingOutcome::Forwarded));
}

/// Test: Notification without an envelope is forwarded with unknown fields
#[tokio::test]
async fn test_missing_envelope_is_forwarded() {
    let server = MockServer::start().await;
    let notification = json!({"priority": "INFO"});

    Mock::given(method("POST"))
        .and(body_json(&notification))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(&server, &[]);

    let outcome = process_message(notification.to_string().as_bytes(), &config, &webhook).await;

    assert!(matches!(outcome, ProcessingOutcome::Forwarded));
}

/// Test: JSON that is not an object is an unexpected error
#[tokio::test]
async fn test_non_object_payload_is_rejected_as_unexpected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (config, webhook) = relay_to(&server, &[]);

    let outcome = process_message(b"[\"compute.instance.create.end\"]", &config, &webhook).await;

    assert!(matches!(outcome, ProcessingOutcome::Failed(RelayError::Unexpected(_))));
    assert_eq!(outcome.ack_decision(), AckDecision::Reject { requeue: false });
}
