//! OneBot v11 HTTP message source
//!
//! Posts JSON actions to a OneBot HTTP endpoint and maps the wire format to
//! [`RawMessage`]. Only the two actions the fetcher needs are implemented:
//! `get_group_msg_history` and `get_login_info`.

use crate::error::FetchError;
use async_trait::async_trait;
use chatdigest_domain::traits::{MessageSource, PageResponse};
use chatdigest_domain::{ContentSegment, FetchCursor, MediaKind, RawMessage, Sender};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for a single action (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Message source backed by a OneBot v11 HTTP endpoint
pub struct OneBotSource {
    base_url: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct HistoryRequest {
    group_id: Value,
    message_seq: i64,
    count: usize,
    #[serde(rename = "reverseOrder")]
    reverse_order: bool,
}

#[derive(Deserialize)]
struct WireMessage {
    message_id: Value,
    time: i64,
    #[serde(default)]
    sender: WireSender,
    #[serde(default)]
    message: Value,
}

#[derive(Deserialize, Default)]
struct WireSender {
    #[serde(default)]
    user_id: Value,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    card: Option<String>,
}

#[derive(Deserialize)]
struct WireSegment {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Map<String, Value>,
}

impl OneBotSource {
    /// Create a source for the endpoint at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a source with a custom per-action timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: None,
            client,
        })
    }

    /// Authenticate with a bearer access token
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Endpoint base URL, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Invoke one action and return its `data` payload
    async fn call_action<B: Serialize + ?Sized>(&self, action: &str, body: &B) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url, action);
        debug!("POST {}", url);

        let mut builder = self.client.post(&url).json(body);
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Communication(format!("HTTP {} from {}", status, action)));
        }

        let raw = response.text().await?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| FetchError::InvalidResponse(format!("{}: {}", action, e)))?;
        unwrap_envelope(value)
    }
}

/// Strip the `{status, retcode, data}` envelope, failing on a non-zero retcode
fn unwrap_envelope(value: Value) -> Result<Value, FetchError> {
    let Value::Object(mut envelope) = value else {
        return Ok(value);
    };
    if let Some(retcode) = envelope.get("retcode").and_then(Value::as_i64) {
        if retcode != 0 {
            let message = envelope
                .get("message")
                .or_else(|| envelope.get("wording"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(FetchError::Api { retcode, message });
        }
    }
    match envelope.remove("data") {
        Some(data) => Ok(data),
        None => Ok(Value::Object(envelope)),
    }
}

/// Turn a history payload into a page, skipping messages that cannot be mapped
fn parse_history(data: &Value) -> PageResponse {
    let Some(messages) = data.get("messages").and_then(Value::as_array) else {
        return PageResponse::Malformed("response has no messages array".to_string());
    };

    let page = messages
        .iter()
        .filter_map(|raw| match map_message(raw) {
            Ok(message) => Some(message),
            Err(reason) => {
                warn!("Skipping unreadable message: {}", reason);
                None
            }
        })
        .collect();
    PageResponse::Messages(page)
}

fn map_message(raw: &Value) -> Result<RawMessage, String> {
    let wire: WireMessage = serde_json::from_value(raw.clone()).map_err(|e| e.to_string())?;
    let message_id = value_as_i64(&wire.message_id).ok_or("message_id is not numeric")?;

    let sender = Sender {
        user_id: value_as_string(&wire.sender.user_id),
        nickname: wire.sender.nickname.unwrap_or_default(),
        card: wire.sender.card.unwrap_or_default(),
    };

    let segments = match wire.message {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<WireSegment>(item).ok())
            .map(map_segment)
            .collect(),
        Value::String(text) => vec![ContentSegment::text(text)],
        _ => Vec::new(),
    };

    Ok(RawMessage::new(message_id, sender, wire.time, segments))
}

fn map_segment(segment: WireSegment) -> ContentSegment {
    let field = |name: &str| {
        segment
            .data
            .get(name)
            .map(value_as_string)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    };

    match segment.kind.as_str() {
        "text" => ContentSegment::Text {
            text: segment
                .data
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        "face" => ContentSegment::Face { id: field("id") },
        "mface" => ContentSegment::MarketFace {
            emoji_id: field("emoji_id"),
        },
        "bface" => ContentSegment::BigFace { id: field("p") },
        "sface" => ContentSegment::SmallFace { id: field("id") },
        "image" => ContentSegment::Image {
            file: field("file"),
            summary: segment
                .data
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        "reply" => ContentSegment::Reply { id: field("id") },
        "record" | "video" => ContentSegment::Media {
            kind: if segment.kind == "record" {
                MediaKind::Record
            } else {
                MediaKind::Video
            },
            descriptor: Value::Object(segment.data.clone()).to_string(),
        },
        _ => ContentSegment::Other { kind: segment.kind.clone() },
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Group ids travel as numbers when they look like one
fn group_id_value(group_id: &str) -> Value {
    group_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(group_id))
}

#[async_trait]
impl MessageSource for OneBotSource {
    type Error = FetchError;

    async fn get_page(
        &self,
        group_id: &str,
        cursor: FetchCursor,
        count: usize,
    ) -> Result<PageResponse, Self::Error> {
        let body = HistoryRequest {
            group_id: group_id_value(group_id),
            message_seq: cursor.value(),
            count,
            reverse_order: true,
        };
        let data = self.call_action("get_group_msg_history", &body).await?;
        Ok(parse_history(&data))
    }

    async fn resolve_self_id(&self) -> Option<String> {
        match self.call_action("get_login_info", &serde_json::json!({})).await {
            Ok(data) => data
                .get("user_id")
                .map(value_as_string)
                .filter(|id| !id.is_empty()),
            Err(e) => {
                warn!("Could not resolve bot identity: {}", e);
                None
            }
        }
    }
}
