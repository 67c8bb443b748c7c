use crate::client::{ApiError, ApiResult, DEFAULT_TIMEOUT, http_client, send_json};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const LLM_MODEL: &str = "gpt-4o-mini";

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
}

#[derive(Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Deserialize, Default)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
}

/// Client for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: http_client("aztlan/0.2"),
            url: url.to_owned(),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Single-turn completion: one system instruction, one user message.
    pub async fn complete(&self, system: &str, user: &str) -> ApiResult<String> {
        let req = ChatCompletionRequest {
            model: &self.model,
            temperature: 0.7,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
        };

        debug!("POST {} ({} chars of prompt)", self.url, system.len() + user.len());
        let request = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&req);
        let resp: ChatCompletionResponse = send_json(request, &self.url).await?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ApiError::NotFound("completion had no text content".into()))
    }
}
