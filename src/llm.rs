use serde::Serialize;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::Config;
use crate::text::truncate_chars;

/// Longest slice of an upstream error body kept in `LlmError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request to model endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response format from model endpoint")]
    MalformedResponse,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

/// OpenAI-compatible chat-completions client (OpenRouter by default).
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    site_url: Option<String>,
    site_name: Option<String>,
}

impl ChatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            site_url: None,
            site_name: None,
        })
    }

    /// Builds a client from config; `None` when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, LlmError> {
        let Some(api_key) = config.openrouter_api_key.as_deref() else {
            return Ok(None);
        };
        let mut client = Self::new(
            config.openrouter_base_url.as_str(),
            api_key,
            config.llm_model.as_str(),
            config.request_timeout,
        )?;
        client.site_url = config.site_url.clone();
        client.site_name = config.site_name.clone();
        Ok(Some(client))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "user".into(),
                    content: prompt.into(),
                }
            ],
        };

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        // Add optional headers if provided
        if let Some(url) = &self.site_url {
            request = request.header("HTTP-Referer", url);
        }

        if let Some(name) = &self.site_name {
            request = request.header("X-Title", name);
        }

        let res = request.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let json: serde_json::Value = res.json().await?;
        extract_reply(&json)
    }
}

fn status_error(status: StatusCode, body: &str) -> LlmError {
    let body = body.trim();
    let kept = truncate_chars(body, MAX_ERROR_BODY_CHARS);
    let body = if kept.len() < body.len() {
        format!("{}...", kept)
    } else {
        kept.to_string()
    };
    LlmError::Status { status, body }
}

fn extract_reply(json: &serde_json::Value) -> Result<String, LlmError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|reply| reply.trim().to_string())
        .ok_or(LlmError::MalformedResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_is_read_from_first_choice() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Hello there \n" } }]
        });
        assert_eq!(extract_reply(&body).unwrap(), "Hello there");
    }

    #[test]
    fn missing_content_is_malformed() {
        let body = json!({ "choices": [] });
        assert!(matches!(extract_reply(&body), Err(LlmError::MalformedResponse)));
    }

    #[test]
    fn upstream_error_body_is_cut_short() {
        let body = "x".repeat(10_000);
        match status_error(StatusCode::BAD_GATEWAY, &body) {
            LlmError::Status { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let short = status_error(StatusCode::UNAUTHORIZED, " bad key \n");
        assert_eq!(short.to_string(), "model endpoint returned 401 Unauthorized: bad key");
    }

    #[test]
    fn no_api_key_means_no_client() {
        let config = Config::default();
        assert!(ChatClient::from_config(&config).unwrap().is_none());
    }
}
