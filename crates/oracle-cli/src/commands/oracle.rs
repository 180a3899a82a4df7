//! `oracle`: ask for today's verdict without running anything.

use anyhow::Result;
use oracle_core::{Gate, IdentityKey, Oracle};

use super::{consult_if_eligible, report_verdict};
use crate::context::AppContext;
use crate::exit::ExitStatus;

pub async fn execute(ctx: &AppContext) -> Result<ExitStatus> {
    let engine = ctx.engine()?;
    consult(&ctx.gate(), &ctx.identity, &engine).await
}

/// Check, then consult with neither target nor module.
pub async fn consult(gate: &Gate, identity: &IdentityKey, oracle: &dyn Oracle) -> Result<ExitStatus> {
    match consult_if_eligible(gate, identity, None, None, oracle).await? {
        Some(outcome) => Ok(report_verdict(&outcome)),
        None => Ok(ExitStatus::LockedOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use oracle_core::{FileLockoutStore, ManualClock, ScriptedOracle, Verdict};
    use std::sync::Arc;

    fn gate(dir: &std::path::Path) -> Gate {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        Gate::new(Arc::new(FileLockoutStore::open(dir)), Arc::new(clock))
    }

    #[tokio::test]
    async fn approval_exits_zero_and_leaves_no_lockout() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate(dir.path());
        let id = IdentityKey::new("u1");

        let status = consult(&gate, &id, &ScriptedOracle::always(Verdict::Approved))
            .await
            .unwrap();
        assert_eq!(status, ExitStatus::Success);
        assert!(gate.check_eligibility(&id).is_eligible());
    }

    #[tokio::test]
    async fn second_call_after_denial_never_reaches_the_oracle() {
        let dir = tempfile::tempdir().unwrap();
        let gate = gate(dir.path());
        let id = IdentityKey::new("u1");
        let oracle = ScriptedOracle::new([Verdict::Denied, Verdict::Approved]);

        assert_eq!(consult(&gate, &id, &oracle).await.unwrap(), ExitStatus::LockedOut);
        assert_eq!(consult(&gate, &id, &oracle).await.unwrap(), ExitStatus::LockedOut);
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn consultation_carries_no_target_or_module() {
        let dir = tempfile::tempdir().unwrap();
        let oracle = ScriptedOracle::always(Verdict::Approved);
        consult(&gate(dir.path()), &IdentityKey::new("u1"), &oracle)
            .await
            .unwrap();

        let request = &oracle.requests()[0];
        assert_eq!(request.target(), None);
        assert_eq!(request.module(), None);
    }
}
