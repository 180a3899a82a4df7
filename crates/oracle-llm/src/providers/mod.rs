//! Decision backend implementations

pub mod anthropic;
pub mod lmstudio;
pub mod offline;
pub mod ollama;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use lmstudio::LmStudioProvider;
pub use offline::{OfflineMode, OfflineProvider};
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;

use oracle_core::{ProviderError, ProviderResult};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Longest slice of an error body quoted back in messages
const ERROR_BODY_LIMIT: usize = 200;

/// Upper bound on reply length requested from chat backends
pub(crate) const MAX_REPLY_TOKENS: u32 = 200;

/// Send `request` once and decode a JSON envelope of type `T`.
///
/// Transport failures map to `Timeout`/`Unavailable`, 401/403 to
/// `Authentication`, other non-2xx to `Unavailable`, and a body that does not
/// decode to `MalformedResponse`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> ProviderResult<T> {
    let response = request
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_error(provider, timeout, e))?;

    let status = response.status();
    debug!("{} responded with HTTP {}", provider, status);

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProviderError::Authentication {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ProviderError::Unavailable {
            provider: provider.to_string(),
            detail: format!("HTTP {}: {}", status, truncate(&error_text)),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, timeout, e))?;

    serde_json::from_str(&body).map_err(|e| ProviderError::MalformedResponse {
        provider: provider.to_string(),
        detail: format!("Failed to parse response: {}", e),
    })
}

fn transport_error(provider: &str, timeout: Duration, e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout {
            provider: provider.to_string(),
            timeout,
        }
    } else {
        // Strip the url so query strings never reach logs
        ProviderError::Unavailable {
            provider: provider.to_string(),
            detail: e.without_url().to_string(),
        }
    }
}

fn truncate(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

/// Malformed-response error for an envelope that decoded but carried no text
pub(crate) fn missing_text(provider: &str, what: &str) -> ProviderError {
    ProviderError::MalformedResponse {
        provider: provider.to_string(),
        detail: format!("response has no {}", what),
    }
}
