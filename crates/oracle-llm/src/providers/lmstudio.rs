//! LM Studio local server (`POST /v1/chat/completions`)

use async_trait::async_trait;
use oracle_core::{ConsultationRequest, ConsultationResponse, ProviderClient, ProviderResult};
use std::time::Duration;
use tracing::debug;

use super::openai::{chat_messages, ChatCompletion};
use super::{send_json, MAX_REPLY_TOKENS};
use crate::verdict::{KeywordParser, ReplyParser};

const PROVIDER_NAME: &str = "LM Studio";

/// LM Studio provider
pub struct LmStudioProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
    parser: Box<dyn ReplyParser>,
}

impl LmStudioProvider {
    /// Create a new LM Studio provider
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
            parser: Box::new(KeywordParser::lenient()),
        }
    }
}

#[async_trait]
impl ProviderClient for LmStudioProvider {
    async fn consult(&self, request: &ConsultationRequest) -> ProviderResult<ConsultationResponse> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": chat_messages(request),
            "temperature": 0.7,
            "max_tokens": MAX_REPLY_TOKENS,
        });

        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!("POST {} (model {})", url, self.model);
        let completion: ChatCompletion =
            send_json(PROVIDER_NAME, self.client.post(&url).json(&body), self.timeout).await?;

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
