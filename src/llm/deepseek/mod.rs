
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::LlmConfig;
use crate::llm::ChatModel;
use crate::{RagError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 120;
const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Blocking client for the DeepSeek chat-completion API (OpenAI-compatible).
#[derive(Debug, Clone)]
pub struct DeepSeekClient {
    base_url: Url,
    api_key: String,
    model: String,
    temperature: f32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    stream: bool,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl DeepSeekClient {
    #[inline]
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| RagError::Config(format!("Invalid LLM base URL: {}", e)))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }
}

impl ChatModel for DeepSeekClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = self
            .base_url
            .join(CHAT_COMPLETIONS_PATH)
            .map_err(|e| RagError::Completion(format!("Failed to build chat URL: {}", e)))?;

        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            stream: false,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let body = serde_json::to_string(&request)
            .map_err(|e| RagError::Completion(format!("Failed to serialize request: {}", e)))?;

        debug!(
            "Requesting completion from {} (model {}, temperature {})",
            url, self.model, self.temperature
        );

        // Remote failures are surfaced as-is; there is no retry logic.
        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| RagError::Completion(format!("Chat API request failed: {}", e)))?;

        let parsed: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::Completion(format!("Failed to parse response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Completion("Response contained no choices".to_string()))?;

        Ok(choice.message.content)
    }
}
