//! Ollama decision backend (`POST /api/generate`)

use async_trait::async_trait;
use oracle_core::{ConsultationRequest, ConsultationResponse, ProviderClient, ProviderResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::send_json;
use crate::prompt::build_completion_prompt;
use crate::verdict::{KeywordParser, ReplyParser};

const PROVIDER_NAME: &str = "Ollama";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama provider
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
    parser: Box<dyn ReplyParser>,
}

impl OllamaProvider {
    /// Create a new Ollama provider. Local models ramble, so replies are
    /// parsed leniently.
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
impl ProviderClient for OllamaProvider {
    async fn consult(&self, request: &ConsultationRequest) -> ProviderResult<ConsultationResponse> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": build_completion_prompt(request),
            "stream": false,
        });

        let url = format!("{}/api/generate", self.base_url);
        debug!("POST {} (model {})", url, self.model);
        let reply: GenerateResponse =
            send_json(PROVIDER_NAME, self.client.post(&url).json(&body), self.timeout).await?;

        let raw = reply.response.trim().to_string();
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
