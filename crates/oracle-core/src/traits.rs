//! Contracts at the two seams of the gate: decision backends and the engine
//! that consults them.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::types::{Consultation, ConsultationRequest, ConsultationResponse};

/// Ways a live backend can fail. Messages never include credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No reply within the configured bound
    #[error("{provider} did not answer within {timeout:?}")]
    Timeout {
        /// Backend display name
        provider: String,
        /// The bound that elapsed
        timeout: Duration,
    },

    /// Connection failure or non-2xx status
    #[error("{provider} is unavailable: {detail}")]
    Unavailable {
        /// Backend display name
        provider: String,
        /// What went wrong
        detail: String,
    },

    /// Credential missing, invalid or refused (401/403)
    #[error("{provider} rejected the credential (HTTP {status})")]
    Authentication {
        /// Backend display name
        provider: String,
        /// HTTP status returned
        status: u16,
    },

    /// The backend replied but the body was not the expected shape
    #[error("{provider} returned a malformed response: {detail}")]
    MalformedResponse {
        /// Backend display name
        provider: String,
        /// What could not be parsed
        detail: String,
    },
}

impl ProviderError {
    /// Failures the engine recovers from by consulting the offline fallback
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, ProviderError::MalformedResponse { .. })
    }

    /// Backend that failed
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::Timeout { provider, .. }
            | ProviderError::Unavailable { provider, .. }
            | ProviderError::Authentication { provider, .. }
            | ProviderError::MalformedResponse { provider, .. } => provider,
        }
    }
}

/// Result type for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A decision backend.
///
/// Each implementation builds its own outbound call and owns the parser that
/// turns the reply text into a verdict.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Ask the backend about `request`
    async fn consult(&self, request: &ConsultationRequest) -> ProviderResult<ConsultationResponse>;

    /// Backend display name
    fn name(&self) -> &str;

    /// Model identifier
    fn model(&self) -> &str;
}

/// Something that always produces a verdict for a request.
///
/// The consultation engine is the production implementation; failure handling
/// (fallback, fail-closed) happens behind this trait so the gate only ever
/// sees a [`Consultation`].
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Obtain a verdict
    async fn consult(&self, request: &ConsultationRequest) -> Consultation;

    /// Human-readable description of the configured backend
    fn describe(&self) -> String;
}
