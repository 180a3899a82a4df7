//! Anthropic Messages API backend (`POST /v1/messages`)

use async_trait::async_trait;
use oracle_config::ApiKey;
use oracle_core::{ConsultationRequest, ConsultationResponse, ProviderClient, ProviderResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{missing_text, send_json, MAX_REPLY_TOKENS};
use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::verdict::{KeywordParser, ReplyParser};

const PROVIDER_NAME: &str = "Anthropic";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic provider
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: ApiKey,
    base_url: String,
    model: String,
    timeout: Duration,
    parser: Box<dyn ReplyParser>,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
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
impl ProviderClient for AnthropicProvider {
    async fn consult(&self, request: &ConsultationRequest) -> ProviderResult<ConsultationResponse> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_REPLY_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [{ "role": "user", "content": build_prompt(request) }],
        });

        let url = format!("{}/v1/messages", self.base_url);
        debug!("POST {} (model {})", url, self.model);
        let builder = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&body);
        let reply: MessagesResponse = send_json(PROVIDER_NAME, builder, self.timeout).await?;

        let raw = reply
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .find_map(|block| block.text)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| missing_text(PROVIDER_NAME, "text content block"))?;
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

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &self.api_key)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
