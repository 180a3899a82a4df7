//! `unlock --confirm`: administrative lockout removal.

use anyhow::{Context, Result};
use colored::Colorize;
use oracle_core::{Gate, IdentityKey};

use crate::context::AppContext;
use crate::exit::ExitStatus;

pub fn execute(ctx: &AppContext, all: bool) -> Result<ExitStatus> {
    unlock(&ctx.gate(), &ctx.identity, all)
}

/// Clear one identity, or wipe the whole store with `all`.
pub fn unlock(gate: &Gate, identity: &IdentityKey, all: bool) -> Result<ExitStatus> {
    if all {
        gate.reset().context("Failed to reset lockout state")?;
        println!("{}", "All lockout state wiped.".green());
        println!("{}", "The Oracle is disappointed in you.".dimmed().italic());
        return Ok(ExitStatus::Success);
    }

    let cleared = gate.clear(identity).with_context(|| {
        format!(
            "Failed to clear the lockout for {}; use --all if the state file is unreadable",
            identity
        )
    })?;
    if cleared {
        println!("{} {}", "Lockout cleared for".green(), identity.as_str().bold());
        println!("{}", "The Oracle is disappointed in you.".dimmed().italic());
    } else {
        println!("{} {}", "No active lockout for".dimmed(), identity.as_str());
    }
    Ok(ExitStatus::Success)
}
