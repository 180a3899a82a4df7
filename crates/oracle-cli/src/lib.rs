//! redteamoracle: a red team CLI whose every module run is gated by an
//! oracle verdict and a 24 hour lockout.

pub mod cli;
pub mod commands;
pub mod context;
pub mod exit;
pub mod modules;
pub mod output;

use anyhow::Result;

use cli::{Cli, Commands};
use context::AppContext;
use exit::ExitStatus;
use modules::ModuleArgs;

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> Result<ExitStatus> {
    // Listing modules needs no config, identity or lockout state
    if let Commands::Modules = cli.command {
        return commands::modules::execute();
    }

    let ctx = AppContext::from_cli(&cli)?;
    match cli.command {
        Commands::Oracle => commands::oracle::execute(&ctx).await,
        Commands::Run {
            module,
            target,
            ports,
            cve,
        } => {
            let args = ModuleArgs { target, ports, cve };
            commands::run::execute(&ctx, &module, args).await
        }
        Commands::Status => commands::status::execute(&ctx),
        Commands::Unlock { all, .. } => commands::unlock::execute(&ctx, all),
        Commands::Modules => commands::modules::execute(),
    }
}
