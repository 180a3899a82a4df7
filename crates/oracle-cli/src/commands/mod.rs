//! Subcommand implementations. Each returns the process exit status.

pub mod modules;
pub mod oracle;
pub mod run;
pub mod status;
pub mod unlock;

use anyhow::Result;
use oracle_core::{Eligibility, Gate, GateOutcome, IdentityKey, Oracle};

use crate::exit::ExitStatus;
use crate::output;

/// Print an existing lockout. `None` means the identity is eligible.
pub(crate) fn report_lockout(eligibility: &Eligibility) -> Option<ExitStatus> {
    match eligibility {
        Eligibility::Eligible => None,
        Eligibility::Locked {
            record,
            remaining,
            corrupted,
        } => {
            output::print_locked(record, *remaining, *corrupted);
            Some(ExitStatus::LockedOut)
        }
    }
}

/// Check `identity`, and consult `oracle` only when it is eligible.
///
/// `None` means an existing lockout was printed and the oracle was never
/// asked.
pub(crate) async fn consult_if_eligible(
    gate: &Gate,
    identity: &IdentityKey,
    target: Option<String>,
    module: Option<String>,
    oracle: &dyn Oracle,
) -> Result<Option<GateOutcome>> {
    if report_lockout(&gate.check_eligibility(identity)).is_some() {
        return Ok(None);
    }

    output::print_consulting(&oracle.describe());
    let outcome = gate.consult_and_gate(identity, target, module, oracle).await?;
    Ok(Some(outcome))
}

/// Print a fresh verdict and pick the exit status for it
pub(crate) fn report_verdict(outcome: &GateOutcome) -> ExitStatus {
    if outcome.is_approved() {
        output::print_approved(&outcome.consultation);
        ExitStatus::Success
    } else {
        output::print_denied(outcome);
        if outcome.consultation.is_degraded() {
            ExitStatus::Degraded
        } else {
            ExitStatus::LockedOut
        }
    }
}
