//! Description client tests against a mock vision endpoint.

use std::time::Duration;

use serde_json::json;
use sketch_vision::{DescribeSketch, DescriptionClient, DescriptionError, VisionConfig};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";
const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

fn client_for(server: &MockServer) -> DescriptionClient {
    let config = VisionConfig::new("test-key").with_base_url(&format!("{}/v1beta", server.uri()));
    DescriptionClient::new(&config).expect("client")
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn describe_returns_first_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "A house with a chimney." }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let description = client_for(&server).describe(JPEG).await.expect("describe");
    assert_eq!(description, "A house with a chimney.");
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn describe_sends_prompt_and_inline_jpeg() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_json(json!({
            "contents": [{
                "parts": [
                    { "text": "Describe this sketch." },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/4A==" } }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client_for(&server).describe(JPEG).await.expect("describe"), "ok");
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn missing_candidates_is_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "OTHER" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).describe(JPEG).await.unwrap_err();
    assert!(matches!(err, DescriptionError::Decode(_)), "got {err:?}");
    assert!(!err.is_transport());
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn server_error_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).describe(JPEG).await.unwrap_err();
    match err {
        DescriptionError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn empty_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = client_for(&server).describe(JPEG).await.unwrap_err();
    assert!(matches!(err, DescriptionError::EmptyBody), "got {err:?}");
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn slow_service_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "candidates": [] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config =
        VisionConfig::new("test-key").with_base_url(&format!("{}/v1beta", server.uri()));
    config.timeout = Duration::from_millis(200);
    let client = DescriptionClient::new(&config).expect("client");

    let err = client.describe(JPEG).await.unwrap_err();
    assert!(matches!(err, DescriptionError::Network(_)), "got {err:?}");
    assert!(err.is_transport());
}
