//! `OpenAI` chat completions provider

use super::types::{LlmMessage, LlmRequest, LlmResponse, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible chat completions service
pub struct OpenAIService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIService {
    /// `gateway` replaces the public endpoint with `{gateway}/openai/v1/chat/completions`
    pub fn new(
        api_key: String,
        model: impl Into<String>,
        gateway: Option<&str>,
    ) -> Result<Self, LlmError> {
        let base_url = match gateway {
            Some(gw) => format!("{}/openai/v1/chat/completions", gw.trim_end_matches('/')),
            None => CHAT_COMPLETIONS_URL.to_string(),
        };

        // No request timeout: a hung completion holds the user's turn open.
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url,
        })
    }

    fn translate_request(&self, request: &LlmRequest) -> OpenAIRequest {
        // Each system instruction stays a separate message
        let mut messages: Vec<OpenAIMessage> = request
            .system
            .iter()
            .map(|s| OpenAIMessage {
                role: "system".to_string(),
                content: Some(s.text.clone()),
            })
            .collect();

        messages.extend(request.messages.iter().map(Self::translate_message));

        OpenAIRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn translate_message(msg: &LlmMessage) -> OpenAIMessage {
        OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: Some(msg.content.clone()),
        }
    }

    fn normalize_response(resp: OpenAIResponse) -> Result<LlmResponse, LlmError> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::malformed("No choices in response"))?;

        let text = choice
            .message
            .content
            .ok_or_else(|| LlmError::malformed("Response message has no content"))?;

        let end_turn = choice.finish_reason.as_deref() == Some("stop");
        let usage = resp.usage.map_or_else(Usage::default, |u| Usage {
            input_tokens: u64::from(u.prompt_tokens),
            output_tokens: u64::from(u.completion_tokens),
        });

        Ok(LlmResponse {
            text,
            end_turn,
            usage,
        })
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let openai_request = self.translate_request(request);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            // Parse error response
            if let Ok(error_resp) = serde_json::from_str::<OpenAIErrorResponse>(&body) {
                let message = error_resp.error.message;
                return Err(match status.as_u16() {
                    401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
                    429 => LlmError::rate_limit(format!("Rate limit exceeded: {message}")),
                    400 => LlmError::invalid_request(format!("Invalid request: {message}")),
                    500..=599 => LlmError::server_error(format!("Server error: {message}")),
                    _ => LlmError::unknown(format!("HTTP {status}: {message}")),
                });
            }
            return Err(LlmError::unknown(format!("HTTP {status} error: {body}")));
        }

        let openai_response: OpenAIResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(openai_response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmErrorKind, SystemContent};
    use serde_json::json;

    fn service(gateway: Option<&str>) -> OpenAIService {
        OpenAIService::new("sk-test".to_string(), "gpt-4o-mini", gateway).unwrap()
    }

    #[test]
    fn test_endpoint_selection() {
        assert_eq!(service(None).base_url, CHAT_COMPLETIONS_URL);
        assert_eq!(
            service(Some("http://gateway.local/llm/")).base_url,
            "http://gateway.local/llm/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_translate_request_keeps_system_messages_separate() {
        let request = LlmRequest {
            system: vec![SystemContent::new("be brief"), SystemContent::new("persona")],
            messages: vec![
                LlmMessage::user("hi"),
                LlmMessage::assistant("hello"),
                LlmMessage::user("hi"),
            ],
            max_tokens: Some(300),
            temperature: Some(0.6),
        };

        let body = serde_json::to_value(service(None).translate_request(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(
            body["messages"],
            json!([
                { "role": "system", "content": "be brief" },
                { "role": "system", "content": "persona" },
                { "role": "user", "content": "hi" },
                { "role": "assistant", "content": "hello" },
                { "role": "user", "content": "hi" },
            ])
        );
        let temperature = body["temperature"].as_f64().unwrap();
        assert!((temperature - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_response_extracts_first_choice() {
        let resp: OpenAIResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Hi there!" }, "finish_reason": "stop" }
            ],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
        }))
        .unwrap();

        let response = OpenAIService::normalize_response(resp).unwrap();
        assert_eq!(response.text, "Hi there!");
        assert!(response.end_turn);
        assert_eq!(response.usage.input_tokens, 12);
        assert_eq!(response.usage.output_tokens, 3);
    }

    #[test]
    fn test_normalize_response_without_choices_is_malformed() {
        let resp: OpenAIResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        let err = OpenAIService::normalize_response(resp).unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Malformed);
    }

    #[test]
    fn test_normalize_response_without_content_is_malformed() {
        let resp: OpenAIResponse = serde_json::from_value(json!({
            "choices": [ { "message": { "role": "assistant", "content": null }, "finish_reason": "length" } ]
        }))
        .unwrap();
        let err = OpenAIService::normalize_response(resp).unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Malformed);
    }
}
