//! Build backends and the consultation engine from resolved configuration.

use oracle_config::{ProviderConfig, ProviderKind};
use oracle_core::ProviderClient;
use std::sync::Arc;
use thiserror::Error;

use crate::consultation::ConsultationEngine;
use crate::providers::{
    AnthropicProvider, LmStudioProvider, OfflineProvider, OllamaProvider, OpenAIProvider,
};

/// Configuration that passed validation but cannot produce a backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    /// HTTP backend without an endpoint
    #[error("{provider} needs a base url")]
    MissingEndpoint {
        /// Backend display name
        provider: &'static str,
    },

    /// Cloud backend without a credential
    #[error("{provider} needs an API key")]
    MissingCredential {
        /// Backend display name
        provider: &'static str,
    },
}

/// Result type for factory functions
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Create the backend described by `config`
pub fn create_provider(config: &ProviderConfig) -> FactoryResult<Arc<dyn ProviderClient>> {
    let endpoint = || {
        config.endpoint().ok_or(FactoryError::MissingEndpoint {
            provider: config.kind.display_name(),
        })
    };
    let credential = || {
        config.credential.clone().ok_or(FactoryError::MissingCredential {
            provider: config.kind.display_name(),
        })
    };

    let provider: Arc<dyn ProviderClient> = match config.kind {
        ProviderKind::LocalModel => Arc::new(OllamaProvider::new(
            endpoint()?,
            config.model.clone(),
            config.timeout,
        )),
        ProviderKind::LocalGui => Arc::new(LmStudioProvider::new(
            endpoint()?,
            config.model.clone(),
            config.timeout,
        )),
        ProviderKind::CloudA => Arc::new(OpenAIProvider::new(
            credential()?,
            endpoint()?,
            config.model.clone(),
            config.timeout,
        )),
        ProviderKind::CloudB => Arc::new(AnthropicProvider::new(
            credential()?,
            endpoint()?,
            config.model.clone(),
            config.timeout,
        )),
        ProviderKind::Offline => Arc::new(OfflineProvider::new(config.offline)),
    };
    Ok(provider)
}

/// Create the engine for `config`: the configured backend plus, for anything
/// other than the offline oracle, a fail-closed offline fallback.
pub fn create_engine(config: &ProviderConfig) -> FactoryResult<ConsultationEngine> {
    let primary = create_provider(config)?;
    Ok(match config.kind {
        ProviderKind::Offline => ConsultationEngine::standalone(primary, config.timeout),
        _ => ConsultationEngine::new(
            primary,
            OfflineProvider::fail_closed(config.offline),
            config.timeout,
        ),
    })
}
