//! LLM client for OpenAI-compatible chat completions (OpenRouter by default)

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::error::CollaboratorError;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Configuration for an LLM API provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL for the API (e.g., "https://openrouter.ai/api/v1")
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Extra headers to include in requests (e.g., X-Title, HTTP-Referer)
    pub extra_headers: Vec<(String, String)>,
    /// Client timeout; `None` waits as long as the provider does
    pub timeout: Option<Duration>,
}

impl ProviderConfig {
    /// Create an OpenRouter provider configuration
    pub fn openrouter(api_key: String) -> Self {
        Self {
            base_url: OPENROUTER_BASE_URL.to_string(),
            api_key,
            extra_headers: vec![
                ("HTTP-Referer".to_string(), "https://github.com/sprout-habits".to_string()),
                ("X-Title".to_string(), "Sprout".to_string()),
            ],
            timeout: None,
        }
    }

    /// Any other OpenAI-compatible endpoint
    pub fn custom(api_key: String, base_url: String) -> Self {
        Self {
            base_url,
            api_key,
            extra_headers: Vec::new(),
            timeout: None,
        }
    }
}

/// Expected shape of the model's answer
#[derive(Debug, Clone, PartialEq)]
pub enum OutputShape {
    /// Free text
    Text,
    /// JSON conforming to the given schema
    Json { name: &'static str, schema: Value },
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

/// LLM API client
#[derive(Clone)]
pub struct LlmClient {
    client: Arc<Client>,
    provider: ProviderConfig,
}

impl LlmClient {
    /// Create a client with a specific provider configuration
    pub fn with_provider(config: ProviderConfig) -> Result<Self, CollaboratorError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: Arc::new(builder.build()?),
            provider: config,
        })
    }

    /// Get the provider configuration
    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Send a chat completion request and return the assistant text
    pub async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        shape: &OutputShape,
        max_tokens: Option<u32>,
    ) -> Result<String, CollaboratorError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            max_tokens,
            response_format: response_format(shape),
        };

        tracing::debug!("LLM request to {} ({} messages)", model, request.messages.len());

        let mut req_builder = self.client
            .post(format!("{}/chat/completions", self.provider.base_url))
            .header("Authorization", format!("Bearer {}", self.provider.api_key));
        for (key, value) in &self.provider.extra_headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }
        let response = req_builder.json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Api { status, body: crate::truncate_safe(&body, 500).to_string() });
        }

        let body = response.text().await?;
        let content = extract_content(&body)?;
        if content.trim().is_empty() {
            return Err(CollaboratorError::Empty);
        }
        Ok(content)
    }
}

/// OpenAI `response_format` for a shape
fn response_format(shape: &OutputShape) -> Option<Value> {
    match shape {
        OutputShape::Text => None,
        OutputShape::Json { name, schema } => Some(serde_json::json!({
            "type": "json_schema",
            "json_schema": { "name": name, "strict": true, "schema": schema }
        })),
    }
}

/// Pull the assistant content out of a raw completions response.
///
/// Handles both string content and the array-of-content-parts format.
pub fn extract_content(body: &str) -> Result<String, CollaboratorError> {
    let raw: Value = serde_json::from_str(body.trim())?;

    let content_value = raw
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"));

    let content = match content_value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| {
                if part.get("type").and_then(|t| t.as_str()) == Some("text") {
                    part.get("text").and_then(|t| t.as_str()).map(|s| s.to_string())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    };

    Ok(content)
}

/// Strip a ```json fence some models wrap structured output in
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_string_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "Hello");
    }

    #[test]
    fn test_extract_parts_content() {
        let body = r#"{"choices":[{"message":{"content":[
            {"type":"text","text":"Hello "},
            {"type":"image_url","image_url":{"url":"x"}},
            {"type":"text","text":"world"}]}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "Hello world");
    }

    #[test]
    fn test_extract_missing_content_is_empty() {
        let body = r#"{"choices":[]}"#;
        assert_eq!(extract_content(body).unwrap(), "");
    }

    #[test]
    fn test_extract_invalid_json() {
        assert!(matches!(extract_content("<html>"), Err(CollaboratorError::Parse(_))));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[\"a\"]\n```"), "[\"a\"]");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  [1]  "), "[1]");
    }

    #[test]
    fn test_response_format() {
        assert!(response_format(&OutputShape::Text).is_none());
        let fmt = response_format(&crate::coach::prompts::string_list_shape("routine")).unwrap();
        assert_eq!(fmt["type"], "json_schema");
        assert_eq!(fmt["json_schema"]["name"], "routine");
        assert_eq!(fmt["json_schema"]["strict"], true);
        assert_eq!(fmt["json_schema"]["schema"]["type"], "object");
    }

    #[test]
    fn test_chat_message_roles() {
        assert_eq!(ChatMessage::user("hi").role, "user");
        assert_eq!(ChatMessage::assistant("hi").role, "assistant");
        assert_eq!(ChatMessage::system("hi").role, "system");
    }
}
