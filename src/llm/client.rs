//! Chat-completions gateway
//!
//! Sends the composed prompt to an OpenAI-compatible endpoint:
//! - One POST per call, bearer auth plus referer/title headers
//! - Non-2xx status fails with `ServiceError`
//! - Anything but `choices[0].message.content` fails with `MalformedResponse`
//! - No retries and no client-side timeout

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::errors::{AssistantError, Result};

/// Text generation seam used by the pipeline
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate a reply to `user_query` under `system_prompt`
    async fn generate(&self, system_prompt: &str, user_query: &str) -> Result<String>;
}

/// HTTPS chat-completions client
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    referer: String,
    title: String,
}

impl ChatCompletionsClient {
    /// Create a client from configuration
    ///
    /// Fails when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AssistantError::ConfigError(format!(
                    "no API key configured (set llm.api_key or {})",
                    crate::config::API_KEY_ENV
                ))
            })?;

        let client = Client::builder().build().map_err(AssistantError::HttpError)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }

    /// Get current model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request<'a>(&'a self, system_prompt: &'a str, user_query: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_query,
                },
            ],
        }
    }
}

#[async_trait]
impl LlmGateway for ChatCompletionsClient {
    async fn generate(&self, system_prompt: &str, user_query: &str) -> Result<String> {
        let request = self.build_request(system_prompt, user_query);

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "Sending chat completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AssistantError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        extract_completion(&body)
    }
}

/// Pull the first choice's text out of a chat-completions body
pub fn extract_completion(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AssistantError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AssistantError::MalformedResponse("no choices in response".to_string()))?;

    choice
        .message
        .content
        .ok_or_else(|| AssistantError::MalformedResponse("first choice has no content".to_string()))
}

/// Chat-completions request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat-completions response, only the fields we read
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> LlmConfig {
        LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_client_requires_api_key() {
        let result = ChatCompletionsClient::from_config(&LlmConfig::default());
        assert!(matches!(result, Err(AssistantError::ConfigError(_))));

        let blank = LlmConfig {
            api_key: Some("   ".to_string()),
            ..LlmConfig::default()
        };
        assert!(ChatCompletionsClient::from_config(&blank).is_err());
    }

    #[test]
    fn test_client_with_config() {
        let client = ChatCompletionsClient::from_config(&config_with_key()).unwrap();
        assert_eq!(client.model(), crate::config::DEFAULT_MODEL);
        assert_eq!(client.endpoint(), crate::config::DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_request_has_system_then_user_turn() {
        let client = ChatCompletionsClient::from_config(&config_with_key()).unwrap();
        let request = client.build_request("be brief", "what is my bill?");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], crate::config::DEFAULT_MODEL);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "be brief");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "what is my bill?");
    }

    #[test]
    fn test_extract_completion_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"first"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_completion(body).unwrap(), "first");
    }

    #[test]
    fn test_extract_completion_malformed() {
        for body in [
            "not json",
            r#"{"id":"x"}"#,
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"text":"legacy"}]}"#,
        ] {
            let result = extract_completion(body);
            assert!(
                matches!(result, Err(AssistantError::MalformedResponse(_))),
                "expected malformed for {}",
                body
            );
        }
    }
}
