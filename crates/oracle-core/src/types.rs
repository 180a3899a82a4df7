//! Core data model: requests, responses, verdicts and lockout records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::IdentityKey;

/// Length of a lockout, in hours
pub const LOCKOUT_HOURS: i64 = 24;

/// Length of a lockout
pub fn lockout_ttl() -> Duration {
    Duration::hours(LOCKOUT_HOURS)
}

/// Normalized outcome of a consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The invocation may proceed
    Approved,
    /// The invocation is refused and a lockout follows
    Denied,
    /// The reply could not be understood; handled exactly like `Denied`
    Inconclusive,
}

impl Verdict {
    /// Only `Approved` lets a module run
    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }

    /// `Denied` and `Inconclusive` both lock the caller out
    pub fn locks_out(&self) -> bool {
        !self.is_approved()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Approved => write!(f, "approved"),
            Verdict::Denied => write!(f, "denied"),
            Verdict::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// Everything a backend is told about the invocation it is judging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultationRequest {
    identity: IdentityKey,
    target: Option<String>,
    module: Option<String>,
    timestamp: DateTime<Utc>,
    prior_lockouts: u32,
}

impl ConsultationRequest {
    /// Build a request. `target` and `module` are `None` for a bare self-check.
    pub fn new(
        identity: IdentityKey,
        target: Option<String>,
        module: Option<String>,
        timestamp: DateTime<Utc>,
        prior_lockouts: u32,
    ) -> Self {
        Self {
            identity,
            target,
            module,
            timestamp,
            prior_lockouts,
        }
    }

    /// Who is asking
    pub fn identity(&self) -> &IdentityKey {
        &self.identity
    }

    /// Target host/domain/IP, if any
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Module about to run, if any
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// When the request was built
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// How many lockouts this identity has collected so far
    pub fn prior_lockouts(&self) -> u32 {
        self.prior_lockouts
    }
}

/// A backend's reply, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultationResponse {
    /// Display name of the backend that answered
    pub provider: String,
    /// Reply text as received
    pub raw: String,
    /// Parsed outcome
    pub verdict: Verdict,
    /// Explanation extracted from the reply
    pub reason: String,
}

impl ConsultationResponse {
    /// Build a response
    pub fn new(
        provider: impl Into<String>,
        raw: impl Into<String>,
        verdict: Verdict,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            raw: raw.into(),
            verdict,
            reason: reason.into(),
        }
    }
}

/// The engine's final word: a response plus the degraded notice when the
/// primary backend failed and the offline fallback decided instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consultation {
    /// The response that decided the verdict
    pub response: ConsultationResponse,
    /// Why the primary backend was bypassed, if it was
    pub degraded: Option<String>,
}

impl Consultation {
    /// A consultation answered by the primary backend
    pub fn primary(response: ConsultationResponse) -> Self {
        Self {
            response,
            degraded: None,
        }
    }

    /// A consultation answered by the fallback
    pub fn degraded(response: ConsultationResponse, why: impl Into<String>) -> Self {
        Self {
            response,
            degraded: Some(why.into()),
        }
    }

    /// The verdict
    pub fn verdict(&self) -> Verdict {
        self.response.verdict
    }

    /// Whether the fallback decided
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// Reason text recorded with a lockout
    pub fn lockout_reason(&self) -> String {
        let reason = self.response.reason.trim();
        match self.response.verdict {
            Verdict::Inconclusive if reason.is_empty() => format!(
                "{} gave an answer the oracle could not read",
                self.response.provider
            ),
            Verdict::Inconclusive => format!("inconclusive answer: {}", reason),
            _ if reason.is_empty() => "The oracle has spoken.".to_string(),
            _ => reason.to_string(),
        }
    }
}

/// An active (or formerly active) lockout for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockoutRecord {
    /// Identity being locked out
    pub identity: IdentityKey,
    /// Why
    pub reason: String,
    /// When the lockout was first issued
    pub issued_at: DateTime<Utc>,
    /// When it ends
    pub expires_at: DateTime<Utc>,
}

impl LockoutRecord {
    /// A fresh record expiring one TTL after `now`
    pub fn issue(identity: IdentityKey, reason: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            reason: reason.into(),
            issued_at: now,
            expires_at: now + lockout_ttl(),
        }
    }

    /// Push expiry to one TTL after `now` and replace the reason
    pub fn extend(&mut self, reason: impl Into<String>, now: DateTime<Utc>) {
        self.reason = reason.into();
        self.expires_at = now + lockout_ttl();
    }

    /// A record whose expiry has been reached is logically absent
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Time left, never negative
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}
