//! OpenAI chat completions backend.
//!
//! The envelope types are shared with LM Studio, which serves the same
//! OpenAI-compatible shape.

use async_trait::async_trait;
use oracle_config::ApiKey;
use oracle_core::{
    ConsultationRequest, ConsultationResponse, ProviderClient, ProviderError, ProviderResult,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{missing_text, send_json, MAX_REPLY_TOKENS};
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::verdict::{KeywordParser, ReplyParser};

const PROVIDER_NAME: &str = "OpenAI";

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletion {
    pub(crate) choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub(crate) message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
}

impl ChatCompletion {
    /// Text of the first choice
    pub(crate) fn into_text(self, provider: &str) -> Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| missing_text(provider, "choices[0].message.content"))
    }
}

/// Chat messages for an OpenAI-shaped request
pub(crate) fn chat_messages(request: &ConsultationRequest) -> serde_json::Value {
    serde_json::json!([
        { "role": "system", "content": SYSTEM_PROMPT },
        { "role": "user", "content": build_prompt(request) },
    ])
}

/// OpenAI provider
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: ApiKey,
    base_url: String,
    model: String,
    timeout: Duration,
    parser: Box<dyn ReplyParser>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(
        api_key: ApiKey,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
            parser: Box::new(KeywordParser::strict()),
        }
    }
}

#[async_trait]
impl ProviderClient for OpenAIProvider {
    async fn consult(&self, request: &ConsultationRequest) -> ProviderResult<ConsultationResponse> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": chat_messages(request),
            "max_tokens": MAX_REPLY_TOKENS,
        });

        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {} (model {})", url, self.model);
        let builder = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body);
        let completion: ChatCompletion = send_json(PROVIDER_NAME, builder, self.timeout).await?;

        let raw = completion.into_text(PROVIDER_NAME)?;
        let (verdict, reason) = self.parser.parse(&raw);
        Ok(ConsultationResponse::new(PROVIDER_NAME, raw, verdict, reason))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("api_key", &self.api_key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
