//! The offline oracle. Rolls dice, performs no I/O, and is always available.

use async_trait::async_trait;
use oracle_config::OfflineSettings;
use oracle_core::{
    ConsultationRequest, ConsultationResponse, ProviderClient, ProviderResult, Verdict,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

const PROVIDER_NAME: &str = "Offline Oracle";

/// Reasons the dice give for saying no
pub const DOOM_MESSAGES: &[&str] = &[
    "It's not your day.",
    "The stars are misaligned. Try again tomorrow.",
    "Mercury is in retrograde. Obviously.",
    "The oracle has consulted the ancient logs. You shall not pass.",
    "Today is a good day to touch some grass instead.",
    "The dice have spoken. They said no.",
    "Error 403: Destiny Forbidden.",
    "The oracle rolled a 1. Critical failure.",
    "Nope. Just… nope.",
    "The vibes are off. Come back tomorrow.",
];

/// Second line of a denial
pub const NOT_PENTEST_DAY_MESSAGES: &[&str] = &[
    "And frankly, it's not the best day for a pentest either.",
    "Your target is also having a bad day, so it evens out.",
    "The SOC team is probably awake today anyway.",
    "Your shells would reverse into the wrong IP anyway.",
    "The CVEs you need were patched this morning. Trust.",
    "Your Burp Suite would have crashed in 3 minutes. You're welcome.",
    "Even your wordlists feel uninspired today.",
];

/// What the dice say on a good day
pub const LUCKY_MESSAGE: &str = "Today is your day. The stars align. Go forth and enumerate things.";

/// How the offline oracle decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineMode {
    /// Deny with the configured doom probability
    Dice,
    /// Always deny. Used as the fallback when the primary backend fails.
    FailClosed,
}

/// Offline oracle provider
pub struct OfflineProvider {
    rng: Mutex<StdRng>,
    doom_probability: f64,
    mode: OfflineMode,
}

impl OfflineProvider {
    /// Dice-rolling oracle. A configured seed makes rolls reproducible.
    pub fn new(settings: OfflineSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
            doom_probability: sanitize_probability(settings.doom_probability),
            mode: OfflineMode::Dice,
        }
    }

    /// Oracle that always denies; only the message is random
    pub fn fail_closed(settings: OfflineSettings) -> Self {
        Self {
            mode: OfflineMode::FailClosed,
            ..Self::new(settings)
        }
    }

    fn decide(&self) -> (Verdict, String) {
        // A poisoned lock only means another roll panicked; the rng is still usable
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let doomed = match self.mode {
            OfflineMode::FailClosed => true,
            OfflineMode::Dice => rng.random_bool(self.doom_probability),
        };

        if !doomed {
            return (Verdict::Approved, LUCKY_MESSAGE.to_string());
        }

        let doom = DOOM_MESSAGES.choose(&mut *rng).copied().unwrap_or("It's not your day.");
        let quip = NOT_PENTEST_DAY_MESSAGES.choose(&mut *rng).copied().unwrap_or_default();
        (Verdict::Denied, format!("{} {}", doom, quip).trim_end().to_string())
    }
}

/// NaN counts as certain doom
fn sanitize_probability(p: f64) -> f64 {
    if p.is_nan() {
        1.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl ProviderClient for OfflineProvider {
    async fn consult(&self, _request: &ConsultationRequest) -> ProviderResult<ConsultationResponse> {
        let (verdict, reason) = self.decide();
        let raw = match verdict {
            Verdict::Approved => format!("APPROVED: {}", reason),
            _ => format!("DENIED: {}", reason),
        };
        Ok(ConsultationResponse::new(PROVIDER_NAME, raw, verdict, reason))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        match self.mode {
            OfflineMode::Dice => "dice",
            OfflineMode::FailClosed => "fail-closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use oracle_core::IdentityKey;

    fn request() -> ConsultationRequest {
        ConsultationRequest::new(IdentityKey::new("u1"), None, None, Utc::now(), 0)
    }

    fn settings(doom_probability: f64, seed: Option<u64>) -> OfflineSettings {
        OfflineSettings {
            doom_probability,
            seed,
        }
    }

    #[tokio::test]
    async fn certain_doom_always_denies() {
        let oracle = OfflineProvider::new(settings(1.0, None));
        for _ in 0..20 {
            let response = oracle.consult(&request()).await.unwrap();
            assert_eq!(response.verdict, Verdict::Denied);
            assert!(DOOM_MESSAGES.iter().any(|m| response.reason.starts_with(m)));
        }
    }

    #[tokio::test]
    async fn zero_doom_always_approves() {
        let oracle = OfflineProvider::new(settings(0.0, None));
        for _ in 0..20 {
            let response = oracle.consult(&request()).await.unwrap();
            assert_eq!(response.verdict, Verdict::Approved);
            assert_eq!(response.reason, LUCKY_MESSAGE);
        }
    }

    #[tokio::test]
    async fn fail_closed_ignores_probability() {
        let oracle = OfflineProvider::fail_closed(settings(0.0, Some(7)));
        for _ in 0..20 {
            assert_eq!(oracle.consult(&request()).await.unwrap().verdict, Verdict::Denied);
        }
        assert_eq!(oracle.model(), "fail-closed");
    }

    #[tokio::test]
    async fn seeded_rolls_are_reproducible() {
        let a = OfflineProvider::new(settings(0.5, Some(42)));
        let b = OfflineProvider::new(settings(0.5, Some(42)));
        for _ in 0..20 {
            assert_eq!(
                a.consult(&request()).await.unwrap(),
                b.consult(&request()).await.unwrap()
            );
        }
    }

    #[tokio::test]
    async fn raw_reply_uses_the_answer_format() {
        let oracle = OfflineProvider::new(settings(1.0, Some(1)));
        let response = oracle.consult(&request()).await.unwrap();
        assert!(response.raw.starts_with("DENIED: "));
    }

    #[test]
    fn invalid_probability_is_sanitized() {
        assert_eq!(sanitize_probability(f64::NAN), 1.0);
        assert_eq!(sanitize_probability(3.0), 1.0);
        assert_eq!(sanitize_probability(-1.0), 0.0);
    }
}
