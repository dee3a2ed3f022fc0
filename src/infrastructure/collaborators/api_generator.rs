//! Instruction generation via the Anthropic messages API.
//!
//! The generator is asked to act as the project lead reviewing an in-flight
//! coding session: it sees the conversation context assembled by the turn
//! manager plus the reason the supervisor decided to step in, and answers
//! with the next instruction to type into the session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::models::{GeneratorConfig, InterventionKind};
use crate::domain::ports::{GenerateError, InstructionGenerator};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str = "You are the project lead supervising an automated coding session. \
You are shown the recent conversation and the reason the supervisor decided to step in. \
Reply with exactly one short, concrete instruction to type into the session's chat input: \
what to do next, phrased directly to the coding assistant. No preamble, no commentary.";

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

/// Anthropic API instruction generator.
pub struct ApiInstructionGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    timeout_secs: u64,
}

impl ApiInstructionGenerator {
    /// Build a generator from configuration. The API key comes from the
    /// config or the `ANTHROPIC_API_KEY` environment variable.
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| {
                GenerateError::NotConfigured(
                    "no API key in config and ANTHROPIC_API_KEY is not set".to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| GenerateError::NotConfigured(err.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
        })
    }

    fn build_request(&self, context: &str, reason: &str, kind: InterventionKind) -> MessageRequest {
        let prompt = format!(
            "Intervention kind: {}\nReason: {reason}\n\nConversation context:\n{context}\n\n\
             What single instruction should be typed into the session now?",
            kind.as_str(),
        );
        MessageRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[async_trait]
impl InstructionGenerator for ApiInstructionGenerator {
    async fn generate(
        &self,
        context: &str,
        reason: &str,
        kind: InterventionKind,
    ) -> Result<String, GenerateError> {
        let request = self.build_request(context, reason, kind);
        debug!(model = %self.model, kind = kind.as_str(), "requesting instruction");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    GenerateError::Timeout(self.timeout_secs)
                } else {
                    GenerateError::RequestFailed(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::RequestFailed(format!(
                "status {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let message: MessageResponse = response
            .json()
            .await
            .map_err(|err| GenerateError::InvalidResponse(err.to_string()))?;

        let text: String = message
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(GenerateError::InvalidResponse(
                "response contained no text blocks".to_string(),
            ));
        }
        Ok(text.trim().to_string())
    }
}
