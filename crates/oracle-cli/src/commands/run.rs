//! `run <module>`: the gated path to a security module.

use anyhow::Result;
use oracle_core::{Gate, IdentityKey, Oracle};
use tracing::info;

use super::{consult_if_eligible, report_verdict};
use crate::context::AppContext;
use crate::exit::ExitStatus;
use crate::modules::{ModuleArgs, ModuleRegistry, SecurityModule};
use crate::output;

pub async fn execute(ctx: &AppContext, module: &str, args: ModuleArgs) -> Result<ExitStatus> {
    let registry = ModuleRegistry::builtin();
    let module = registry.get(module)?;
    let engine = ctx.engine()?;
    run_module(&ctx.gate(), &ctx.identity, module, &args, &engine).await
}

/// Gate `module` behind the oracle and run it only on approval.
///
/// Arguments are validated before anything is consulted, so a typo never
/// costs a lockout.
pub async fn run_module(
    gate: &Gate,
    identity: &IdentityKey,
    module: &dyn SecurityModule,
    args: &ModuleArgs,
    oracle: &dyn Oracle,
) -> Result<ExitStatus> {
    module.validate(args)?;

    let target = Some(args.target.clone());
    let name = Some(module.name().to_string());
    let Some(outcome) = consult_if_eligible(gate, identity, target, name, oracle).await? else {
        return Ok(ExitStatus::LockedOut);
    };

    let status = report_verdict(&outcome);
    if status != ExitStatus::Success {
        return Ok(status);
    }

    info!(module = module.name(), target = %args.target, "Running module");
    let report = module.run(args)?;
    output::print_report(&report);
    Ok(ExitStatus::Success)
}
