//! HTTP client for the generative vision endpoint.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::VisionConfig;
use crate::error::{DescriptionError, DescriptionResult};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// MIME type of the snapshot payload.
pub const JPEG_MIME: &str = "image/jpeg";

/// Anything that can turn a JPEG snapshot into a text description.
#[async_trait]
pub trait DescribeSketch: Send + Sync {
    /// Describe one encoded JPEG image.
    async fn describe(&self, jpeg: &[u8]) -> DescriptionResult<String>;
}

/// Client for the `generateContent` endpoint.
#[derive(Clone)]
pub struct DescriptionClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    prompt: String,
}

impl std::fmt::Debug for DescriptionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptionClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl DescriptionClient {
    /// Create a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptionError::InvalidUrl`] if the base URL and model do
    /// not form a valid URL, [`DescriptionError::MissingApiKey`] for a blank
    /// key, and [`DescriptionError::Network`] if the HTTP client fails to
    /// build.
    pub fn new(config: &VisionConfig) -> DescriptionResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(DescriptionError::MissingApiKey {
                var: crate::config::API_KEY_VAR.into(),
            });
        }
        let endpoint = endpoint_url(&config.base_url, &config.model)?;

        let http = Client::builder()
            .user_agent(concat!("sketch-vision/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            // Disable proxy detection to avoid macOS system-configuration panic
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            prompt: config.prompt.clone(),
        })
    }

    /// Full request URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Build the JSON body for one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptionError::Encode`] if the body cannot be serialized.
    pub fn request_body(&self, jpeg: &[u8]) -> DescriptionResult<Value> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text {
                        text: self.prompt.clone(),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: JPEG_MIME,
                            data: STANDARD.encode(jpeg),
                        },
                    },
                ],
            }],
        };
        Ok(serde_json::to_value(request)?)
    }

    async fn send(&self, jpeg: &[u8]) -> DescriptionResult<String> {
        tracing::debug!(
            bytes = jpeg.len(),
            endpoint = %self.endpoint,
            "Requesting sketch description"
        );
        let body = self.request_body(jpeg)?;
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(DescriptionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Err(DescriptionError::EmptyBody);
        }
        parse_description(&text)
    }
}

#[async_trait]
impl DescribeSketch for DescriptionClient {
    async fn describe(&self, jpeg: &[u8]) -> DescriptionResult<String> {
        match self.send(jpeg).await {
            Ok(description) => Ok(description),
            Err(err) => {
                tracing::warn!("Sketch description failed: {err}");
                Err(err)
            }
        }
    }
}

/// `{base}/models/{model}:generateContent`.
fn endpoint_url(base_url: &str, model: &str) -> DescriptionResult<Url> {
    let raw = format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    );
    let url = Url::parse(&raw).map_err(|e| DescriptionError::InvalidUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DescriptionError::InvalidUrl(format!(
            "unsupported scheme: {}",
            url.scheme()
        )));
    }
    Ok(url)
}

/// Extract `candidates[0].content.parts[0].text`.
///
/// # Errors
///
/// Returns [`DescriptionError::Decode`] if the body is not JSON or any
/// element along the path is missing.
pub fn parse_description(body: &str) -> DescriptionResult<String> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| DescriptionError::Decode(e.to_string()))?;
    value
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            DescriptionError::Decode("missing candidates[0].content.parts[0].text".into())
        })
}

// Wire types

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_url() {
        let url = endpoint_url(
            "https://generativelanguage.googleapis.com/v1beta/",
            "gemini-1.5-flash",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_endpoint_rejects_garbage() {
        assert!(matches!(
            endpoint_url("not a url", "m"),
            Err(DescriptionError::InvalidUrl(_))
        ));
        assert!(matches!(
            endpoint_url("ftp://example.com", "m"),
            Err(DescriptionError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let client = DescriptionClient::new(&VisionConfig::new("k")).unwrap();
        let body = client.request_body(&[0xFF, 0xD8, 0xFF]).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        { "text": "Describe this sketch." },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_blank_key_rejected() {
        let err = DescriptionClient::new(&VisionConfig::new("")).unwrap_err();
        assert!(matches!(err, DescriptionError::MissingApiKey { .. }));
    }

    #[test]
    fn test_parse_description() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "A cat." }] } }]
        })
        .to_string();
        assert_eq!(parse_description(&body).unwrap(), "A cat.");
    }

    #[test]
    fn test_parse_missing_candidates() {
        let err = parse_description(r#"{"promptFeedback":{}}"#).unwrap_err();
        assert!(matches!(err, DescriptionError::Decode(_)));
    }

    #[test]
    fn test_parse_empty_parts() {
        let body = json!({ "candidates": [{ "content": { "parts": [] } }] }).to_string();
        assert!(matches!(
            parse_description(&body),
            Err(DescriptionError::Decode(_))
        ));
    }

    #[test]
    fn test_parse_not_json() {
        assert!(matches!(
            parse_description("<html>"),
            Err(DescriptionError::Decode(_))
        ));
    }
}
