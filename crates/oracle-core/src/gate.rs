//! The eligibility gate.
//!
//! Per identity there are two states, `Eligible` and `Locked`. A check never
//! consults an oracle; a consultation that does not come back `Approved`
//! locks the identity out for [`LOCKOUT_HOURS`](crate::LOCKOUT_HOURS).
//!
//! The gate decides, it never runs the module that was asked about.

use chrono::Duration;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::identity::IdentityKey;
use crate::lockout::{LockoutStore, StoreError};
use crate::traits::Oracle;
use crate::types::{Consultation, ConsultationRequest, LockoutRecord};

/// Reason recorded on the placeholder record reported when the store cannot
/// be read
pub const UNREADABLE_STATE_REASON: &str = "lockout state is unreadable";

/// Errors surfaced by the gate
#[derive(Error, Debug)]
pub enum GateError {
    /// The lockout store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for gate operations
pub type GateResult<T> = Result<T, GateError>;

/// Whether an identity may consult the oracle right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// No active lockout
    Eligible,
    /// Locked out until `record.expires_at`
    Locked {
        /// The active record
        record: LockoutRecord,
        /// Time left, never negative
        remaining: Duration,
        /// True when the store could not be read and the gate failed closed
        corrupted: bool,
    },
}

impl Eligibility {
    /// Shorthand for `matches!(self, Eligibility::Eligible)`
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Result of a consultation that went through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    /// What the oracle said
    pub consultation: Consultation,
    /// The lockout written because of it, if any
    pub lockout: Option<LockoutRecord>,
}

impl GateOutcome {
    /// Whether the downstream module may run
    pub fn is_approved(&self) -> bool {
        self.consultation.verdict().is_approved()
    }
}

/// Gate over a lockout store and a clock.
#[derive(Clone)]
pub struct Gate {
    store: Arc<dyn LockoutStore>,
    clock: Arc<dyn Clock>,
}

impl Gate {
    /// Create a gate
    pub fn new(store: Arc<dyn LockoutStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Read-only check. Never calls an oracle and never writes.
    ///
    /// A store that cannot be read reports `Locked` with `corrupted` set.
    pub fn check_eligibility(&self, identity: &IdentityKey) -> Eligibility {
        let now = self.clock.now();
        match self.store.get(identity, now) {
            Ok(None) => Eligibility::Eligible,
            Ok(Some(record)) => Eligibility::Locked {
                remaining: record.remaining_at(now),
                record,
                corrupted: false,
            },
            Err(e) => {
                warn!(
                    "Lockout state unreadable, refusing consultation: {}. \
                     Run `redteamoracle unlock --confirm --all` to reset it.",
                    e
                );
                let record = LockoutRecord::issue(identity.clone(), UNREADABLE_STATE_REASON, now);
                Eligibility::Locked {
                    remaining: record.remaining_at(now),
                    record,
                    corrupted: true,
                }
            }
        }
    }

    /// Consult `oracle` and lock the identity out on any verdict other than
    /// `Approved`.
    ///
    /// The store is only written after the verdict is in hand, with no await
    /// in between, so dropping this future leaves the store untouched.
    pub async fn consult_and_gate(
        &self,
        identity: &IdentityKey,
        target: Option<String>,
        module: Option<String>,
        oracle: &dyn Oracle,
    ) -> GateResult<GateOutcome> {
        let prior = self.store.prior_lockouts(identity)?;
        let request = ConsultationRequest::new(
            identity.clone(),
            target,
            module,
            self.clock.now(),
            prior,
        );
        debug!(identity = %identity, prior_lockouts = prior, "Consulting {}", oracle.describe());

        let consultation = oracle.consult(&request).await;
        info!(
            identity = %identity,
            verdict = %consultation.verdict(),
            provider = %consultation.response.provider,
            degraded = consultation.is_degraded(),
            "Oracle verdict"
        );

        let lockout = if consultation.verdict().locks_out() {
            let reason = consultation.lockout_reason();
            Some(self.store.put_or_extend(identity, &reason, self.clock.now())?)
        } else {
            None
        };

        Ok(GateOutcome {
            consultation,
            lockout,
        })
    }

    /// Administrative clear of one identity. Returns whether it was locked.
    pub fn clear(&self, identity: &IdentityKey) -> GateResult<bool> {
        let cleared = self.store.clear(identity)?;
        if cleared {
            info!(identity = %identity, "Lockout cleared");
        }
        Ok(cleared)
    }

    /// Administrative wipe of all lockout state
    pub fn reset(&self) -> GateResult<()> {
        self.store.reset()?;
        info!("Lockout state reset");
        Ok(())
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate").finish_non_exhaustive()
    }
}
