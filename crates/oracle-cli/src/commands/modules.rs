//! `modules`: list what `run` can dispatch to.

use anyhow::Result;

use crate::exit::ExitStatus;
use crate::modules::ModuleRegistry;
use crate::output;

pub fn execute() -> Result<ExitStatus> {
    output::print_modules(&ModuleRegistry::builtin().records());
    Ok(ExitStatus::Success)
}
