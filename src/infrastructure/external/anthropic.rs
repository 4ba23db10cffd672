//! Anthropic Messages API クライアント
use crate::error::{AnkiVocabError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// 生成パラメータ
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 1500,
            temperature: 0.7,
        }
    }
}

pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnkiVocabError::ConfigInitError(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// システムプロンプトとユーザープロンプトを送り、最初のテキストブロックを返す
    pub async fn complete(
        &self,
        system: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = MessagesRequest {
            model: &options.model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnkiVocabError::ServiceError(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnkiVocabError::ServiceError(format!("reading response: {}", e)))?;

        if !status.is_success() {
            return Err(AnkiVocabError::ServiceError(format!(
                "API request failed with status {}: {}",
                status, body
            )));
        }

        first_text_block(&body)
    }
}

/// レスポンス本文から最初の text ブロックを取り出す
fn first_text_block(body: &str) -> Result<String> {
    let parsed: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| AnkiVocabError::ServiceError(format!("unexpected response body: {}", e)))?;
    parsed
        .content
        .into_iter()
        .find(|b| b.kind == "text")
        .and_then(|b| b.text)
        .ok_or_else(|| AnkiVocabError::ParseError("response contained no text block".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_text_block() {
        let body = r#"{
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "{\"german\": \"Hund\"}"}],
            "stop_reason": "end_turn"
        }"#;
        assert_eq!(first_text_block(body).unwrap(), r#"{"german": "Hund"}"#);
    }

    #[test]
    fn empty_content_is_parse_error() {
        let err = first_text_block(r#"{"content": []}"#).unwrap_err();
        assert!(matches!(err, AnkiVocabError::ParseError(_)));
    }

    #[test]
    fn non_json_body_is_service_error() {
        let err = first_text_block("<html>Bad Gateway</html>").unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn request_serializes_messages_api_shape() {
        let req = MessagesRequest {
            model: "claude-test",
            max_tokens: 1500,
            temperature: 0.7,
            system: "sys",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "claude-test");
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["system"], "sys");
    }
}
