//! Consultation engine: one bounded call to the configured backend, with a
//! fail-closed offline fallback when that backend cannot be reached.

use async_trait::async_trait;
use oracle_core::{
    Consultation, ConsultationRequest, ConsultationResponse, Oracle, ProviderClient,
    ProviderError, Verdict,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::providers::OfflineProvider;

/// Slack on top of the provider's own request timeout before the engine
/// gives up on the call itself
const TIMEOUT_GRACE: Duration = Duration::from_millis(250);

/// The production [`Oracle`].
///
/// No retries: at most one network call plus one zero-I/O fallback.
pub struct ConsultationEngine {
    primary: Arc<dyn ProviderClient>,
    fallback: Option<OfflineProvider>,
    timeout: Duration,
}

impl ConsultationEngine {
    /// Consult `primary`, falling back to `fallback` on availability failures.
    pub fn new(
        primary: Arc<dyn ProviderClient>,
        fallback: OfflineProvider,
        timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallback: Some(fallback),
            timeout,
        }
    }

    /// Engine whose primary already is the offline oracle and needs no fallback
    pub fn standalone(primary: Arc<dyn ProviderClient>, timeout: Duration) -> Self {
        Self {
            primary,
            fallback: None,
            timeout,
        }
    }

    /// Name of the primary backend
    pub fn provider_name(&self) -> &str {
        self.primary.name()
    }

    /// Model of the primary backend
    pub fn model(&self) -> &str {
        self.primary.model()
    }

    async fn call_primary(
        &self,
        request: &ConsultationRequest,
    ) -> Result<ConsultationResponse, ProviderError> {
        let bound = self.timeout.saturating_add(TIMEOUT_GRACE);
        match tokio::time::timeout(bound, self.primary.consult(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                provider: self.primary.name().to_string(),
                timeout: self.timeout,
            }),
        }
    }

    async fn fall_back(&self, request: &ConsultationRequest, error: ProviderError) -> Consultation {
        let why = error.to_string();
        warn!("{}; the offline oracle decides instead (fail-closed)", why);

        let response = match &self.fallback {
            Some(fallback) => fallback.consult(request).await.ok(),
            None => None,
        };
        let response = response
            .filter(|r| !r.verdict.is_approved())
            .unwrap_or_else(|| {
                ConsultationResponse::new(
                    self.primary.name(),
                    "",
                    Verdict::Denied,
                    "The oracle could not be reached, so the answer is no.",
                )
            });
        Consultation::degraded(response, why)
    }
}

#[async_trait]
impl Oracle for ConsultationEngine {
    async fn consult(&self, request: &ConsultationRequest) -> Consultation {
        debug!(
            "Consulting {} ({}) with timeout {}s",
            self.primary.name(),
            self.primary.model(),
            self.timeout.as_secs()
        );

        match self.call_primary(request).await {
            Ok(response) => Consultation::primary(response),
            Err(ProviderError::MalformedResponse { provider, detail }) => {
                warn!("{} returned a malformed response: {}", provider, detail);
                Consultation::primary(ConsultationResponse::new(
                    provider,
                    "",
                    Verdict::Inconclusive,
                    detail,
                ))
            }
            Err(error) => self.fall_back(request, error).await,
        }
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.primary.name(), self.primary.model())
    }
}
