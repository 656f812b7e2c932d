use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use sms_locator::dispatch::{Ack, CapabilitySet, DispatchSettings, Phase};
use sms_locator::platform::{FixScript, HttpSmsGateway, ScriptedPositioning};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::harness;

fn gateway(server: &MockServer) -> Arc<HttpSmsGateway> {
    Arc::new(HttpSmsGateway::new(
        &format!("{}/sms", server.uri()),
        Some("test-key"),
        Duration::from_secs(5),
    ))
}

fn positioning() -> Arc<ScriptedPositioning> {
    Arc::new(ScriptedPositioning::new(FixScript::Fix(harness::bogota())))
}

#[tokio::test]
async fn send_posts_encoded_segments_to_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sms"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let settings = DispatchSettings {
        segment_limit: 40,
        ..DispatchSettings::default()
    };
    let rig = harness::spawn(settings, CapabilitySet::all(), positioning(), gateway(&server));
    rig.handle.update_destination("3012345678").await.unwrap();
    assert!(matches!(rig.handle.submit().await.unwrap(), Ack::Started { .. }));

    let done = rig.handle.settled().await.unwrap();
    assert_eq!(done.phase, Phase::Succeeded, "{done:?}");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["to"], "+573012345678");
    let parts: Vec<String> = body["parts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|part| part.as_str().unwrap().to_string())
        .collect();
    assert!(parts.len() > 1);
    assert!(parts.iter().all(|part| part.chars().count() <= 40));
    assert!(parts.concat().starts_with("GPS Location:\nLAT: 4.710000\nLON: -74.072100\n"));

    rig.handle.shutdown().await;
}

#[tokio::test]
async fn gateway_rejection_becomes_failed_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"error":"destination unreachable"}"#),
        )
        .mount(&server)
        .await;

    let rig = harness::spawn(
        DispatchSettings::default(),
        CapabilitySet::all(),
        positioning(),
        gateway(&server),
    );
    rig.handle.update_destination("3012345678").await.unwrap();
    rig.handle.submit().await.unwrap();

    let done = rig.handle.settled().await.unwrap();
    assert_eq!(done.phase, Phase::Failed);
    assert!(done.position.is_none());
    assert_eq!(
        done.error_message.as_deref(),
        Some("Failed to send SMS: destination unreachable")
    );
    assert_eq!(done.destination, "3012345678");

    rig.handle.shutdown().await;
}
