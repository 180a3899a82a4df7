//! Provider selection and the resolved, read-only provider configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::credentials::ApiKey;
use crate::error::ConfigError;

/// Probability that the offline oracle decides it is not your day.
pub const DEFAULT_DOOM_PROBABILITY: f64 = 0.42;

/// The closed set of decision backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Local model server (Ollama)
    #[serde(alias = "ollama")]
    LocalModel,
    /// GUI-hosted local server (LM Studio)
    #[serde(alias = "lmstudio", alias = "lm-studio")]
    LocalGui,
    /// First cloud API (OpenAI)
    #[serde(alias = "openai", alias = "chatgpt")]
    CloudA,
    /// Second cloud API (Anthropic)
    #[serde(alias = "anthropic", alias = "claude")]
    CloudB,
    /// Deterministic, zero-I/O oracle
    #[default]
    #[serde(alias = "none")]
    Offline,
}

impl ProviderKind {
    /// Canonical CLI name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::LocalModel => "local-model",
            ProviderKind::LocalGui => "local-gui",
            ProviderKind::CloudA => "cloud-a",
            ProviderKind::CloudB => "cloud-b",
            ProviderKind::Offline => "offline",
        }
    }

    /// Human-readable backend name
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::LocalModel => "Ollama",
            ProviderKind::LocalGui => "LM Studio",
            ProviderKind::CloudA => "OpenAI",
            ProviderKind::CloudB => "Anthropic",
            ProviderKind::Offline => "Offline Oracle",
        }
    }

    /// Name used to look the credential up in env vars and the secrets file
    pub fn credential_name(&self) -> Option<&'static str> {
        match self {
            ProviderKind::CloudA => Some("openai"),
            ProviderKind::CloudB => Some("anthropic"),
            _ => None,
        }
    }

    /// Default endpoint, `None` for the offline oracle
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::LocalModel => Some("http://localhost:11434"),
            ProviderKind::LocalGui => Some("http://localhost:1234"),
            ProviderKind::CloudA => Some("https://api.openai.com/v1"),
            ProviderKind::CloudB => Some("https://api.anthropic.com"),
            ProviderKind::Offline => None,
        }
    }

    /// Default model name
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::LocalModel => "llama3",
            ProviderKind::LocalGui => "local-model",
            ProviderKind::CloudA => "gpt-4o-mini",
            ProviderKind::CloudB => "claude-haiku-4-5-20251001",
            ProviderKind::Offline => "dice",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local-model" | "ollama" => Ok(ProviderKind::LocalModel),
            "local-gui" | "lmstudio" | "lm-studio" | "lm_studio" => Ok(ProviderKind::LocalGui),
            "cloud-a" | "openai" | "chatgpt" => Ok(ProviderKind::CloudA),
            "cloud-b" | "anthropic" | "claude" => Ok(ProviderKind::CloudB),
            "offline" | "none" | "" => Ok(ProviderKind::Offline),
            _ => Err(ConfigError::UnknownProvider {
                name: s.to_string(),
            }),
        }
    }
}

/// Settings for the dice-rolling offline oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfflineSettings {
    /// Probability in `[0, 1]` of a denial
    pub doom_probability: f64,
    /// Fixed RNG seed for reproducible rolls
    pub seed: Option<u64>,
}

impl Default for OfflineSettings {
    fn default() -> Self {
        Self {
            doom_probability: DEFAULT_DOOM_PROBABILITY,
            seed: None,
        }
    }
}

/// Fully resolved provider configuration. Built once per invocation.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Which backend to consult
    pub kind: ProviderKind,
    /// Endpoint, `None` for the offline oracle
    pub base_url: Option<Url>,
    /// Model name passed to the backend
    pub model: String,
    /// Credential for cloud backends
    pub credential: Option<ApiKey>,
    /// Bound on the single primary call
    pub timeout: Duration,
    /// Offline oracle settings (also used by the fallback)
    pub offline: OfflineSettings,
}

impl ProviderConfig {
    /// Offline configuration, always constructible
    pub fn offline(offline: OfflineSettings) -> Self {
        Self {
            kind: ProviderKind::Offline,
            base_url: None,
            model: ProviderKind::Offline.default_model().to_string(),
            credential: None,
            timeout: Duration::from_secs(crate::loader::DEFAULT_TIMEOUT_SECS),
            offline,
        }
    }

    /// Base url as a string with any trailing slash removed
    pub fn endpoint(&self) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|u| u.as_str().trim_end_matches('/').to_string())
    }
}

/// Parse and check a base url. Only http and https are accepted.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
