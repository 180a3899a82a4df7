//! `status`: read-only lockout report.

use anyhow::Result;

use crate::context::AppContext;
use crate::exit::ExitStatus;
use crate::output;

/// Always succeeds; a lockout is information here, not a failure.
pub fn execute(ctx: &AppContext) -> Result<ExitStatus> {
    let eligibility = ctx.gate().check_eligibility(&ctx.identity);
    output::print_status(ctx.identity.as_str(), &eligibility);
    Ok(ExitStatus::Success)
}
