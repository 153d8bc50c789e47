/// Vision Client: the single point of entry for calls to the vision model.
///
/// Speaks the OpenAI-compatible chat completions protocol (OpenRouter by
/// default). The API key is supplied per call so the extraction orchestrator
/// can rotate keys; this client only classifies failures.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::VisionModel;

pub mod prompts;

pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.2-11b-vision-instruct";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const APP_TITLE: &str = "Resume Parser";
const TEMPERATURE: f64 = 0.1;
const MAX_TOKENS: u32 = 2000;

/// Substrings in an error body that mean "try another key".
const ROTATABLE_MARKERS: &[&str] = &[
    "rate limit",
    "quota",
    "resource_exhausted",
    "resource exhausted",
    "api key",
    "unauthorized",
];

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Vision model returned empty content")]
    EmptyContent,
}

impl VisionError {
    /// Rate limits, exhausted quota and rejected keys are worth retrying
    /// with another key. Everything else is not.
    pub fn is_rotatable(&self) -> bool {
        match self {
            VisionError::Api { status, message } => {
                matches!(status, 401 | 403 | 429) || {
                    let message = message.to_lowercase();
                    ROTATABLE_MARKERS.iter().any(|m| message.contains(m))
                }
            }
            _ => false,
        }
    }

    /// Short failure class for logs. Never includes key material.
    pub fn class(&self) -> &'static str {
        match self {
            VisionError::Http(_) => "transport",
            VisionError::Api { status: 429, .. } => "rate_limited",
            VisionError::Api {
                status: 401 | 403, ..
            } => "unauthorized",
            VisionError::Api { .. } if self.is_rotatable() => "quota",
            VisionError::Api { .. } => "api",
            VisionError::EmptyContent => "empty",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Value,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<Value>,
}

impl ApiErrorBody {
    fn status(&self) -> Option<u16> {
        self.code
            .as_ref()
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct VisionClient {
    client: Client,
    base_url: String,
    model: String,
    site_url: Option<String>,
}

impl VisionClient {
    pub fn new(base_url: String, model: String, site_url: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            site_url,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes exactly one chat completion call with the given key.
    /// Failures are classified and returned; the orchestrator decides whether
    /// another key is worth trying.
    async fn call(&self, api_key: &str, request: &ChatRequest<'_>) -> Result<String, VisionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut builder = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .header("X-Title", APP_TITLE)
            .json(request);
        if let Some(site_url) = &self.site_url {
            builder = builder.header("HTTP-Referer", site_url);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Vision API returned {status}");
            return Err(VisionError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body: ChatResponse = response.json().await?;
        reply_text(body)
    }
}

#[async_trait]
impl VisionModel for VisionClient {
    async fn complete(
        &self,
        api_key: &str,
        prompt: &str,
        images: &[String],
    ) -> Result<String, VisionError> {
        let mut parts = vec![ContentPart::Text { text: prompt }];
        parts.extend(images.iter().map(|data| ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:image/png;base64,{data}"),
            },
        }));

        let request = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(prompts::RESUME_PARSER_SYSTEM),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(parts),
                },
            ],
        };

        let text = self.call(api_key, &request).await?;
        debug!("Vision reply received ({} chars)", text.len());
        Ok(text)
    }
}

/// Pulls the message out of an `{"error": {"message": ..}}` body, or returns
/// the body as-is.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.to_string())
}

/// Some gateways report upstream failures inside a 200 body.
fn reply_text(body: ChatResponse) -> Result<String, VisionError> {
    if let Some(error) = body.error {
        return Err(VisionError::Api {
            status: error.status().unwrap_or(200),
            message: error.message.unwrap_or_else(|| "unknown error".to_string()),
        });
    }
    let content = body
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .unwrap_or(Value::Null);
    let text = content_text(&content);
    if text.is_empty() {
        return Err(VisionError::EmptyContent);
    }
    Ok(text)
}

/// Message content is either a string or an array of `{type, text}` parts.
fn content_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.trim().to_string(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect::<String>()
            .trim()
            .to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn api(status: u16, message: &str) -> VisionError {
        VisionError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_rotatable_statuses_and_messages() {
        assert!(api(429, "slow down").is_rotatable());
        assert!(api(401, "").is_rotatable());
        assert!(api(403, "").is_rotatable());
        assert!(api(400, "RESOURCE_EXHAUSTED: try later").is_rotatable());
        assert!(api(200, "Quota exceeded for this key").is_rotatable());
        assert!(api(400, "Invalid API key provided").is_rotatable());

        assert!(!api(500, "internal error").is_rotatable());
        assert!(!api(400, "image too large").is_rotatable());
        assert!(!VisionError::EmptyContent.is_rotatable());
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(api(429, "").class(), "rate_limited");
        assert_eq!(api(401, "").class(), "unauthorized");
        assert_eq!(api(400, "quota").class(), "quota");
        assert_eq!(api(502, "bad gateway").class(), "api");
    }

    #[test]
    fn test_content_text_accepts_string_or_parts() {
        assert_eq!(content_text(&json!("  {\"a\":1}  ")), "{\"a\":1}");
        assert_eq!(
            content_text(&json!([{"type": "text", "text": "{\"a\":"}, {"type": "text", "text": "1}"}])),
            "{\"a\":1}"
        );
        assert_eq!(content_text(&Value::Null), "");
    }

    #[test]
    fn test_reply_text_surfaces_embedded_errors() {
        let body: ChatResponse = serde_json::from_value(json!({
            "error": {"message": "Rate limit exceeded", "code": 429}
        }))
        .unwrap();
        let err = reply_text(body).unwrap_err();
        assert!(err.is_rotatable());

        let empty: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": ""}}]
        }))
        .unwrap();
        assert!(matches!(reply_text(empty), Err(VisionError::EmptyContent)));
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"error": {"message": "No auth credentials found", "code": 401}}"#),
            "No auth credentials found"
        );
        assert_eq!(error_message("plain failure"), "plain failure");
    }

    #[test]
    fn test_request_serializes_image_parts() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: "prompt" },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,QUJD".to_string(),
                        },
                    },
                ]),
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        let parts = &value["messages"][0]["content"];
        assert_eq!(parts[0], json!({"type": "text", "text": "prompt"}));
        assert_eq!(
            parts[1],
            json!({"type": "image_url", "image_url": {"url": "data:image/png;base64,QUJD"}})
        );
        assert_eq!(value["max_tokens"], 2000);
    }

    /// Serves every connection with the same canned response and counts requests.
    async fn canned_server(status_line: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}"), hits)
    }

    /// Reads headers and the full body so the client never sees a reset.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let Ok(n) = socket.read(&mut chunk).await else { return };
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    #[tokio::test]
    async fn test_server_error_is_sent_once_and_returned() {
        let (base_url, hits) = canned_server(
            "500 Internal Server Error",
            r#"{"error": {"message": "upstream exploded"}}"#,
        )
        .await;
        let client = VisionClient::new(base_url, DEFAULT_MODEL.to_string(), None);

        let err = client
            .complete("key-a", "prompt", &["QUJD".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(&err, VisionError::Api { status: 500, message } if message == "upstream exploded"));
        assert!(!err.is_rotatable());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_returned_without_retry() {
        let (base_url, hits) =
            canned_server("429 Too Many Requests", r#"{"error": {"message": "Rate limit exceeded"}}"#)
                .await;
        let client = VisionClient::new(base_url, DEFAULT_MODEL.to_string(), None);

        let err = client.complete("key-a", "prompt", &[]).await.unwrap_err();

        assert!(err.is_rotatable());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_successful_reply_returns_content() {
        let (base_url, hits) = canned_server(
            "200 OK",
            r#"{"choices": [{"message": {"content": "{\"name\": \"Ada\"}"}}]}"#,
        )
        .await;
        let client = VisionClient::new(base_url, DEFAULT_MODEL.to_string(), None);

        let text = client.complete("key-a", "prompt", &[]).await.unwrap();

        assert_eq!(text, r#"{"name": "Ada"}"#);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
