//! Anthropic Messages API client
//!
//! Non-streaming `POST /v1/messages`. Retry policy is left to the caller.

use crate::types::anthropic::{
    AnthropicErrorEnvelope, Message, MessagesRequest, MessagesResponse, ToolDescriptor,
};
use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Debug, Clone)]
pub struct AnthropicClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
}

impl AnthropicClientConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

pub struct AnthropicClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(config: AnthropicClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(config.api_key.trim()).context("invalid API key header value")?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        let endpoint = format!("{}/v1/messages", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            model: config.model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn create_message(
        &self,
        system: Option<&str>,
        tools: &[ToolDescriptor],
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<MessagesResponse> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            system,
            tools,
            messages,
        };

        debug!(
            "Sending messages request: model={}, messages={}, tools={}",
            self.model,
            messages.len(),
            tools.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Messages request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<AnthropicErrorEnvelope>(&body)
                .map(|envelope| String::from(envelope.error))
                .unwrap_or(body);
            warn!("Messages API returned error: status={}, detail={}", status, detail);
            return Err(anyhow!("Messages API error ({}): {}", status, detail));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse messages response: {}", e))?;

        debug!(
            "Messages response: id={:?}, stop_reason={:?}, blocks={}",
            body.id,
            body.stop_reason,
            body.content.len()
        );

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::anthropic::StopReason;
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn messages_handler(headers: AxumHeaders, Json(body): Json<Value>) -> impl IntoResponse {
        if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "type": "error",
                    "error": {"type": "authentication_error", "message": "invalid x-api-key"}
                })),
            )
                .into_response();
        }

        let reply = format!(
            "model={} tools={}",
            body["model"].as_str().unwrap_or(""),
            body["tools"].as_array().map(Vec::len).unwrap_or(0)
        );
        Json(json!({
            "id": "msg_test",
            "stop_reason": "end_turn",
            "content": [{"type": "text", "text": reply}]
        }))
        .into_response()
    }

    async fn spawn_server() -> String {
        let app = Router::new().route("/v1/messages", post(messages_handler));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String, api_key: &str) -> AnthropicClient {
        let mut config = AnthropicClientConfig::new(api_key, "claude-3-haiku-20240307");
        config.base_url = base_url;
        AnthropicClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn create_message_round_trips_against_local_server() {
        let base = spawn_server().await;
        let tools = vec![ToolDescriptor {
            name: "get_chain_stats".to_string(),
            description: "stats".to_string(),
            input_schema: json!({"type": "object", "properties": {}}),
        }];
        let response = client(base, "test-key")
            .create_message(None, &tools, &[Message::user_text("hi")], 64)
            .await
            .expect("request should succeed");

        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
        assert_eq!(
            response.first_text(),
            Some("model=claude-3-haiku-20240307 tools=1")
        );
    }

    #[tokio::test]
    async fn api_error_envelope_is_reported() {
        let base = spawn_server().await;
        let err = client(base, "wrong-key")
            .create_message(None, &[], &[Message::user_text("hi")], 64)
            .await
            .expect_err("bad key should fail");

        let message = err.to_string();
        assert!(message.contains("401"), "{message}");
        assert!(message.contains("authentication_error"), "{message}");
    }
}
